use std::{fmt, marker::PhantomData};

use serde::Serialize;

/// A value bound to a named SQL parameter.
///
/// Values are handed to the executor exactly as extracted; nothing here
/// coerces between types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => f.write_str("NULL"),
            ParamValue::Bool(value) => write!(f, "{value}"),
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::UInt(value) => write!(f, "{value}"),
            ParamValue::Float(value) => write!(f, "{value}"),
            ParamValue::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
            ParamValue::Bytes(bytes) => {
                f.write_str("X'")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
        }
    }
}

macro_rules! impl_from_for_param_value {
    ($variant:ident: $($source:ty),+) => {
        $(
            impl From<$source> for ParamValue {
                fn from(value: $source) -> Self {
                    ParamValue::$variant(value.into())
                }
            }
        )+
    };
}

impl_from_for_param_value!(Bool: bool);
impl_from_for_param_value!(Int: i8, i16, i32, i64, u8, u16, u32);
impl_from_for_param_value!(UInt: u64);
impl_from_for_param_value!(Float: f32, f64);
impl_from_for_param_value!(Text: String, &str);
impl_from_for_param_value!(Bytes: Vec<u8>, &[u8]);

impl From<isize> for ParamValue {
    fn from(value: isize) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::UInt(value as u64)
    }
}

impl<T> From<Option<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// One ordered (name, value) pair of a generated command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The resolved field names of one row shape, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    names: Vec<String>,
    folded: Vec<String>,
}

impl FieldList {
    pub const fn empty() -> Self {
        Self {
            names: Vec::new(),
            folded: Vec::new(),
        }
    }

    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect::<Vec<String>>();
        let folded = names.iter().map(|name| name.to_lowercase()).collect();
        Self { names, folded }
    }

    pub fn from_static(names: &[&'static str]) -> Self {
        Self::new(names.iter().copied())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Finds the field whose name equals `name` ignoring case.
    ///
    /// The whole name must match: `aa` never matches a field named `a` or
    /// `aaa`.
    pub fn position_ignore_case(&self, name: &str) -> Option<usize> {
        self.folded.iter().position(|folded_name| {
            folded_name
                .chars()
                .eq(name.chars().flat_map(char::to_lowercase))
        })
    }

    /// Pairs every field name with the value at the same position.
    pub fn zip_params(&self, values: Vec<ParamValue>) -> Vec<Param> {
        self.names
            .iter()
            .zip(values)
            .map(|(name, value)| Param {
                name: name.clone(),
                value,
            })
            .collect()
    }
}

/// A value whose public fields are bound as named parameters.
///
/// Implement it with [`bulk_params!`](crate::bulk_params), which caches the
/// field list once per type.
pub trait ParamSource {
    fn fields() -> &'static FieldList
    where
        Self: Sized;

    /// Field values in the same order as [`ParamSource::fields`].
    fn values(&self) -> Vec<ParamValue>;

    fn params(&self) -> Vec<Param>
    where
        Self: Sized,
    {
        Self::fields().zip_params(self.values())
    }
}

impl ParamSource for () {
    fn fields() -> &'static FieldList {
        static EMPTY: FieldList = FieldList::empty();
        &EMPTY
    }

    fn values(&self) -> Vec<ParamValue> {
        Vec::new()
    }
}

impl<T: ParamSource> ParamSource for &T {
    fn fields() -> &'static FieldList {
        T::fields()
    }

    fn values(&self) -> Vec<ParamValue> {
        (**self).values()
    }
}

/// Resolves the field list of a row shape once and reads each row's values.
pub trait FieldExtractor<R> {
    fn fields(&self) -> &FieldList;

    fn values(&self, row: &R) -> Vec<ParamValue>;
}

/// Field extractor for any statically shaped [`ParamSource`].
pub struct SourceFields<R>(PhantomData<fn(&R)>);

impl<R> SourceFields<R> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R> Default for SourceFields<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ParamSource> FieldExtractor<R> for SourceFields<R> {
    fn fields(&self) -> &FieldList {
        R::fields()
    }

    fn values(&self, row: &R) -> Vec<ParamValue> {
        row.values()
    }
}

/// Implements [`ParamSource`] for a struct, listing its fields in declaration
/// order.
///
/// ```
/// use sql_bulk_insert::{bulk_params, domain::param::ParamSource};
///
/// struct Widget {
///     name: String,
///     size: i32,
/// }
///
/// bulk_params!(Widget { name, size });
///
/// let names = Widget::fields().names();
/// assert_eq!(names, ["name", "size"]);
/// ```
#[macro_export]
macro_rules! bulk_params {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::domain::param::ParamSource for $ty {
            fn fields() -> &'static $crate::domain::param::FieldList {
                static FIELDS: ::std::sync::LazyLock<$crate::domain::param::FieldList> =
                    ::std::sync::LazyLock::new(|| {
                        $crate::domain::param::FieldList::from_static(&[$(stringify!($field)),*])
                    });
                &FIELDS
            }

            fn values(&self) -> ::std::vec::Vec<$crate::domain::param::ParamValue> {
                ::std::vec![
                    $($crate::domain::param::ParamValue::from(
                        ::std::clone::Clone::clone(&self.$field)
                    )),*
                ]
            }
        }
    };
}
