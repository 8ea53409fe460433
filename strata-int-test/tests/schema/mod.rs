mod schema_statements_test;
