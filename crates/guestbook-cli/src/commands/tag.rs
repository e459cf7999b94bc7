//! Tag command handlers

use anyhow::Result;

use guestbook_core::Guestbook;

use crate::output::Output;

/// List all tags with usage counts
pub fn list(guestbook: &Guestbook, output: &Output) -> Result<()> {
    let tags = guestbook.tag_usage()?;
    output.print_tags(&tags);
    Ok(())
}
