pub mod generate_bulk_insert;
