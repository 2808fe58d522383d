//! Outbound ports - capabilities the pipeline requires from the outside world

mod confirm_port;
mod parser_port;
mod site_port;

pub use confirm_port::ConfirmPort;
pub use parser_port::ListingParserPort;
pub use site_port::MonsterSitePort;
