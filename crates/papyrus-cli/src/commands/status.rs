//! Status command handler

use anyhow::Result;

use papyrus_core::Store;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let head = store.head_summary()?;
    let revisions = store.revision_count()?;
    let papers = store.entries().len();
    let missing = store.validate().len();
    let tags = store.list_tags()?.len();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "store": store.root(),
                    "index": store.index_path(),
                    "revisions": revisions,
                    "head": head.as_ref().map(|h| serde_json::json!({
                        "id": h.id,
                        "summary": h.summary,
                        "time": h.time.to_rfc3339(),
                    })),
                    "counts": {
                        "papers": papers,
                        "missing_pdfs": missing,
                        "tags": tags
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.root().display());
        }
        OutputFormat::Human => {
            println!("papyrus Status");
            println!("==============");
            println!();
            println!("Store:");
            println!("  Location: {}", store.root().display());
            println!("  Index:    {}", store.index_path().display());
            println!();
            println!("History:");
            println!("  Revisions: {}", revisions);
            if let Some(ref head) = head {
                println!(
                    "  HEAD:      {} {} ({})",
                    head.id,
                    head.summary,
                    head.time.format("%Y-%m-%d %H:%M")
                );
            }
            println!();
            println!("Contents:");
            println!("  Papers:       {}", papers);
            println!("  Missing PDFs: {}", missing);
            println!("  Tags:         {}", tags);
        }
    }

    Ok(())
}
