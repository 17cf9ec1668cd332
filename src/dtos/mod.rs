pub mod bookingdtos;
pub mod opportunitydtos;
pub mod reviewdtos;
pub mod servicedtos;
pub mod userdtos;
