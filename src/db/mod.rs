pub mod bookingdb;
pub mod db;
pub mod opportunitydb;
pub mod reviewdb;
pub mod servicedb;
pub mod userdb;
