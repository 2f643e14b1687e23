use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use crate::domain::{
    error::{BulkInsertError, BulkInsertResult},
    param::FieldList,
};

// Matches `VALUES (...) ...` on the reversed SQL text. Scanning the reversed
// text left to right finds the rightmost ellipsis first, and the lazy group
// then stops at the nearest `(` preceded by `VALUES`.
static REVERSED_VALUES_CLAUSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\.\.\.\s*(\).*?\()\s*[sS][eE][uU][lL][aA][vV]\b")
        .expect("values clause regex should compile")
});

static PARAMETER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[@:?]\w+\b").expect("parameter regex should compile"));

/// The single `VALUES (...)...` tuple of an insert statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValuesTemplate<'a> {
    sql: &'a str,
    clause_start: usize,
    tuple_start: usize,
    tuple_end: usize,
    suffix_start: usize,
}

impl<'a> ValuesTemplate<'a> {
    /// Locates the only tuple followed by `...` in `sql`.
    pub fn locate(sql: &'a str) -> BulkInsertResult<Self> {
        let reversed_sql = sql.chars().rev().collect::<String>();
        let mut clause_matches = REVERSED_VALUES_CLAUSE_REGEX.captures_iter(&reversed_sql);

        let clause_captures = clause_matches
            .next()
            .ok_or(BulkInsertError::MissingValuesTuple)?;
        let extra_clause_count = clause_matches.count();
        if extra_clause_count > 0 {
            return Err(BulkInsertError::AmbiguousValuesTuple {
                count: extra_clause_count + 1,
            });
        }

        let (Some(reversed_clause), Some(reversed_tuple)) =
            (clause_captures.get(0), clause_captures.get(1))
        else {
            return Err(BulkInsertError::MissingValuesTuple);
        };

        // Reversing chars keeps each char's bytes, so offset `n` from the end
        // of the reversed text is offset `len - n` of `sql`.
        let sql_len = sql.len();
        Ok(Self {
            sql,
            clause_start: sql_len - reversed_clause.end(),
            tuple_start: sql_len - reversed_tuple.end(),
            tuple_end: sql_len - reversed_tuple.start(),
            suffix_start: sql_len - reversed_clause.start(),
        })
    }

    pub fn sql(&self) -> &'a str {
        self.sql
    }

    /// Text before the tuple's opening parenthesis.
    pub fn prefix(&self) -> &'a str {
        &self.sql[..self.tuple_start]
    }

    /// The tuple, parentheses included.
    pub fn tuple(&self) -> &'a str {
        &self.sql[self.tuple_start..self.tuple_end]
    }

    /// Text after the ellipsis.
    pub fn suffix(&self) -> &'a str {
        &self.sql[self.suffix_start..]
    }

    /// Byte range of `VALUES (...)...` within the SQL.
    pub fn clause_range(&self) -> Range<usize> {
        self.clause_start..self.suffix_start
    }

    /// Byte range of the tuple within the SQL.
    pub fn tuple_range(&self) -> Range<usize> {
        self.tuple_start..self.tuple_end
    }

    /// Offsets within [`ValuesTemplate::tuple`] just past each parameter
    /// token that names a row field.
    pub fn row_param_ends(&self, row_fields: &FieldList) -> Vec<usize> {
        PARAMETER_REGEX
            .find_iter(self.tuple())
            .filter(|token| row_fields.position_ignore_case(&token.as_str()[1..]).is_some())
            .map(|token| token.end())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{error::BulkInsertError, param::FieldList};

    use super::ValuesTemplate;

    #[test]
    fn splits_minimal_insert_around_tuple() {
        let template = ValuesTemplate::locate("INSERT INTO t (foo)VALUES(@foo)...;")
            .expect("template should be located");

        assert_eq!(template.prefix(), "INSERT INTO t (foo)VALUES");
        assert_eq!(template.tuple(), "(@foo)");
        assert_eq!(template.suffix(), ";");
        assert_eq!(template.clause_range(), 19..34);
    }

    #[test]
    fn rejects_sql_without_marked_tuple() {
        for sql in ["", "VALUE (@foo)...", "VALUES (@foo)..", "1VALUES (@foo)..."] {
            assert_eq!(
                ValuesTemplate::locate(sql),
                Err(BulkInsertError::MissingValuesTuple),
                "{sql:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_more_than_one_marked_tuple() {
        assert_eq!(
            ValuesTemplate::locate("VALUES (@foo)... VALUES (@foo)..."),
            Err(BulkInsertError::AmbiguousValuesTuple { count: 2 })
        );
    }

    #[test]
    fn only_the_marked_clause_is_templated() {
        let sql =
            "INSERT INTO t VALUES (@t); INSERT INTO u VALUES (@u)...; INSERT INTO v VALUES (@v);";
        let template = ValuesTemplate::locate(sql).expect("template should be located");

        assert_eq!(template.tuple(), "(@u)");
        assert_eq!(template.prefix(), "INSERT INTO t VALUES (@t); INSERT INTO u VALUES ");
        assert_eq!(template.suffix(), "; INSERT INTO v VALUES (@v);");
    }

    #[test]
    fn keeps_nested_parentheses_inside_tuple() {
        let template = ValuesTemplate::locate("VALUES (@a + (@d * @c) -\r\n\t@d)...")
            .expect("template should be located");

        assert_eq!(template.tuple(), "(@a + (@d * @c) -\r\n\t@d)");
    }

    #[test]
    fn values_keyword_is_case_insensitive() {
        let template =
            ValuesTemplate::locate("VaLueS(@foo)...").expect("template should be located");
        assert_eq!(template.prefix(), "VaLueS");
    }

    #[test]
    fn drops_whitespace_between_tuple_and_ellipsis() {
        let sql = "\r\n\t VALUES\n\t \r(\t \r\n@foo \r\n\t)\r\n\t ...\t\r\n";
        let template = ValuesTemplate::locate(sql).expect("template should be located");

        assert_eq!(template.prefix(), "\r\n\t VALUES\n\t \r");
        assert_eq!(template.tuple(), "(\t \r\n@foo \r\n\t)");
        assert_eq!(template.suffix(), "\t\r\n");
    }

    #[test]
    fn maps_offsets_back_through_multibyte_text() {
        let sql = "INSERT INTO café (naïve) VALUES (@naïve, 'é')... -- fin";
        let template = ValuesTemplate::locate(sql).expect("template should be located");

        assert_eq!(template.tuple(), "(@naïve, 'é')");
        assert_eq!(template.suffix(), " -- fin");
        assert_eq!(&sql[template.tuple_range()], template.tuple());
    }

    #[test]
    fn row_param_ends_skip_common_and_prefix_names() {
        let template = ValuesTemplate::locate("values (@a, @aa, :aaa, ?aaaa)...")
            .expect("template should be located");
        let row_fields = FieldList::new(["aa", "AAAA"]);

        let ends = template.row_param_ends(&row_fields);
        let tuple = template.tuple();

        assert_eq!(ends.len(), 2);
        assert_eq!(&tuple[..ends[0]], "(@a, @aa");
        assert_eq!(&tuple[..ends[1]], "(@a, @aa, :aaa, ?aaaa");
    }
}
