use std::net::Ipv4Addr;

use crate::{Error, Result};

const BUCKET_LENGTH: &str = "Must be between 3 and 63 characters";
const BUCKET_CHARS: &str = "May only contain lowercase letters, numbers, dots, and dashes";
const BUCKET_ENDS: &str = "First and last character must be either lowercase letter, or number";
const BUCKET_DOTS: &str = "May not contain two consecutive dots";
const BUCKET_IP: &str = "May not be formatted as an IP address";
const BUCKET_PREFIX: &str = "May not start with the reserved prefixes 'xn--', 'sthree-' or 'amzn-s3-demo-'";
const BUCKET_SUFFIX: &str = "May not end with the reserved suffixes '-s3alias', '--ol-s3', '.mrap', '--x-s3' or '--table-s3'";

const RESERVED_PREFIXES: [&str; 3] = ["xn--", "sthree-", "amzn-s3-demo-"];
const RESERVED_SUFFIXES: [&str; 5] = ["-s3alias", "--ol-s3", ".mrap", "--x-s3", "--table-s3"];

/// checks a physical bucket name against the S3 naming rules.
/// see https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html
pub fn validate_bucket_name(name: &str) -> Result<()> {
    let invalid = |reason| Err(Error::InvalidBucketName { name: name.to_string(), reason });
    if name.len() > 63 || name.len() < 3 {
        return invalid(BUCKET_LENGTH);
    }
    let valid_char_check = |c: char| -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-'
    };
    if !name.chars().all(valid_char_check) {
        return invalid(BUCKET_CHARS);
    }
    let bytes = name.as_bytes();
    let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return invalid(BUCKET_ENDS);
    }
    if name.contains("..") {
        return invalid(BUCKET_DOTS);
    }
    if name.parse::<Ipv4Addr>().is_ok() {
        return invalid(BUCKET_IP);
    }
    if RESERVED_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        return invalid(BUCKET_PREFIX);
    }
    if RESERVED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
        return invalid(BUCKET_SUFFIX);
    }
    Ok(())
}

/// A stack name can contain only alphanumeric characters (case sensitive) and hyphens.
/// It must start with an alphabetical character and can't be longer than 128 characters.
pub fn validate_stack_name(name: &str) -> Result<()> {
    let reason = "Must only consist of alphanumeric characters and hyphens, Must start with an alphabetical character, and cannot be longer than 128 characters.";
    let invalid = || Err(Error::InvalidStackName { name: name.to_string(), reason });
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return invalid(),
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return invalid();
    }
    if name.len() > 128 {
        return invalid();
    }
    Ok(())
}

pub fn validate_logical_id(name: &str) -> Result<()> {
    let invalid = |reason| Err(Error::InvalidLogicalId { name: name.to_string(), reason });
    if name.len() > 255 {
        return invalid("must be less than 255 characters");
    }
    if name.is_empty() {
        return invalid("Must contain at least 1 character");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return invalid("Must contain only alphanumeric characters [A-Za-z0-9]");
    }
    Ok(())
}
