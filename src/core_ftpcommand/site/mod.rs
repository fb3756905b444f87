pub mod site_chmod;
