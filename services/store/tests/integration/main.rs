
mod account_test;
mod purchase_test;
mod sync_test;
mod table_client_test;
