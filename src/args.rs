use std::error::Error;

pub struct ArgParser {
    iter: std::vec::IntoIter<String>,
    command_name: String,
}

impl ArgParser {
    pub fn new(args: Vec<String>, command_name: &str) -> Self {
        Self { iter: args.into_iter(), command_name: command_name.to_string() }
    }

    /// Extract a single tag from -t/--tag flag
    pub fn extract_tag(&mut self) -> Result<String, Box<dyn Error>> {
        match self.iter.next() {
            Some(v) => {
                let tag = crate::tags::normalize_tag(&v);
                if tag.is_empty() {
                    Err(format!(
                        "Invalid tag provided to {}",
                        self.command_name
                    )
                    .into())
                } else {
                    Ok(tag)
                }
            }
            None => Err(format!(
                "Provide a tag after -t/--tag for {}",
                self.command_name
            )
            .into()),
        }
    }

    /// Extract a string value for a flag
    pub fn extract_value(
        &mut self,
        flag: &str,
    ) -> Result<String, Box<dyn Error>> {
        self.iter.next().ok_or_else(|| {
            format!("Provide a value after {} for {}", flag, self.command_name)
                .into()
        })
    }

    /// Extract an on/off switch value for a flag
    pub fn extract_switch(
        &mut self,
        flag: &str,
    ) -> Result<bool, Box<dyn Error>> {
        let raw = self.extract_value(flag)?;
        crate::config::parse_switch(&raw).ok_or_else(|| {
            format!("Expected on|off after {} for {}, got {}", flag, self.command_name, raw)
                .into()
        })
    }

    /// Error for a flag this command does not know
    pub fn unknown(&self, flag: &str) -> Box<dyn Error> {
        format!("Unknown flag for {}: {}", self.command_name, flag).into()
    }

    /// Get next positional argument
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<String> {
        self.iter.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_parser_extract_tag() {
        let args = vec!["-t".to_string(), "#todo".to_string()];
        let mut parser = ArgParser::new(args, "test");
        let flag = parser.next().unwrap();
        assert_eq!(flag, "-t");
        let tag = parser.extract_tag().unwrap();
        assert_eq!(tag, "todo");
        assert!(parser.extract_tag().is_err());
    }

    #[test]
    fn test_arg_parser_extract_value() {
        let args = vec!["--category".to_string(), "Ops".to_string()];
        let mut parser = ArgParser::new(args, "test");
        let flag = parser.next().unwrap();
        assert_eq!(flag, "--category");
        let value = parser.extract_value("--category").unwrap();
        assert_eq!(value, "Ops");
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_arg_parser_extract_switch() {
        let args = vec!["on".to_string(), "sideways".to_string()];
        let mut parser = ArgParser::new(args, "prefs");
        assert!(parser.extract_switch("--compact").unwrap());
        let err = parser.extract_switch("--dark").unwrap_err();
        assert!(err.to_string().contains("sideways"));
    }
}
