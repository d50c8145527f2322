pub mod system_user;
