mod naming_test;
