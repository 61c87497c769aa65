/// Values a serializer on the other end of a shared link may have written for "nothing".
const SENTINELS: [&str; 2] = ["undefined", "null"];

pub const MAX_ATTRIBUTE_LEN: usize = 64;

pub struct FilterValidator;

impl FilterValidator {
    /// Trims `raw` and returns it unless it is blank or a sentinel.
    pub fn meaningful(raw: &str) -> Option<&str> {
        let value = raw.trim();
        if value.is_empty() || SENTINELS.contains(&value) {
            None
        } else {
            Some(value)
        }
    }

    pub fn validate_attribute_name(name: &str) -> Result<&str, String> {
        let name =
            Self::meaningful(name).ok_or_else(|| format!("Blank attribute name: {:?}", name))?;
        if name.chars().count() > MAX_ATTRIBUTE_LEN {
            return Err(format!("Attribute name too long: {}", name));
        }
        if name.chars().any(char::is_control) {
            return Err(format!("Attribute name contains control characters: {:?}", name));
        }
        Ok(name)
    }

    pub fn validate_attribute_value(value: &str) -> Result<&str, String> {
        let value =
            Self::meaningful(value).ok_or_else(|| format!("Blank attribute value: {:?}", value))?;
        if value.chars().count() > MAX_ATTRIBUTE_LEN {
            return Err(format!("Attribute value too long: {}", value));
        }
        Ok(value)
    }
}
