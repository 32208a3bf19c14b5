//! Tag command handlers

use anyhow::Result;

use papyrus_core::{Store, TagOutcome};

use crate::output::Output;

/// List all tags
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let tags = store.list_tags()?;
    output.print_list(&tags);
    Ok(())
}

/// Tag a paper
pub fn tag(store: &Store, paper: String, tag_name: String, output: &Output) -> Result<()> {
    match store.tag(&paper, &tag_name)? {
        TagOutcome::Created => output.success(&format!("Tagged {} as {}", paper, tag_name)),
        TagOutcome::AlreadyTagged => {
            output.message(&format!("{} is already tagged {}", paper, tag_name))
        }
    }
    Ok(())
}

/// List the papers carrying a tag
pub fn tagged(store: &Store, tag_name: String, output: &Output) -> Result<()> {
    let papers = store.tagged(&tag_name)?;
    output.print_list(&papers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use papyrus_core::Config;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> Store {
        let config = Config {
            store_dir: temp_dir.path().join("papers"),
            author_name: Some("Test".to_string()),
            author_email: Some("test@example.com".to_string()),
            log_file: None,
        };
        Store::open_with_config(&config).unwrap()
    }

    #[test]
    fn test_tag_twice_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let output = Output::new(OutputFormat::Quiet);

        tag(&store, "foo".to_string(), "ml".to_string(), &output).unwrap();
        tag(&store, "foo".to_string(), "ml".to_string(), &output).unwrap();

        assert_eq!(store.tagged("ml").unwrap(), vec!["foo"]);
        list(&store, &output).unwrap();
        tagged(&store, "ml".to_string(), &output).unwrap();
    }

    #[test]
    fn test_tag_invalid_name_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let output = Output::new(OutputFormat::Quiet);

        assert!(tag(&store, "foo".to_string(), "a/b".to_string(), &output).is_err());
    }
}
