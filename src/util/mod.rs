pub mod password;
pub mod real_ip_key_extractor;
pub mod token;
