pub mod site_record;
