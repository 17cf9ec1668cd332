pub mod bookingmodel;
pub mod opportunitymodel;
pub mod reviewmodel;
pub mod servicemodel;
pub mod usermodel;
