//! Terminal interaction: prompts, flair menus and the plan table

use dialoguer::{Confirm, Input, Select};
use libsubcast::service::batch::{FlairSelector, PlannedPost};
use libsubcast::{Community, Flair, Result, SubcastError};

const NO_FLAIR: &str = "(no flair)";

/// Asks on the terminal which flair to use for each community
///
/// The first flair is preselected; the last menu entry posts without flair.
pub struct PromptSelector;

impl FlairSelector for PromptSelector {
    fn select(&mut self, community: &Community, flairs: &[Flair]) -> Result<Option<usize>> {
        let mut items: Vec<&str> = flairs.iter().map(|f| display_text(f)).collect();
        items.push(NO_FLAIR);

        let selection = Select::new()
            .with_prompt(format!("Select flair for r/{}", community))
            .items(&items)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        Ok((selection < flairs.len()).then_some(selection))
    }
}

/// Prompt for the post title
pub fn prompt_title() -> Result<String> {
    Input::<String>::new()
        .with_prompt("Title")
        .interact_text()
        .map_err(prompt_error)
}

/// Prompt for the post body
pub fn prompt_body() -> Result<String> {
    Input::<String>::new()
        .with_prompt("Body")
        .interact_text()
        .map_err(prompt_error)
}

/// Ask before anything is posted
pub fn confirm_post(count: usize) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("Post to {} communities?", count))
        .default(true)
        .interact()
        .map_err(prompt_error)
}

/// Render the numbered community/flair table shown before posting
pub fn plan_table(plan: &[PlannedPost]) -> String {
    let width = plan
        .iter()
        .map(|p| p.community.as_str().len())
        .max()
        .unwrap_or(0)
        .max("Subreddit".len());

    let mut out = format!("{:>3}  {:<width$}  Flair\n", "#", "Subreddit", width = width);
    for (i, planned) in plan.iter().enumerate() {
        let flair = planned
            .flair
            .as_ref()
            .map(display_text)
            .unwrap_or("None");
        out.push_str(&format!(
            "{:>3}  {:<width$}  {}\n",
            i + 1,
            planned.community.as_str(),
            flair,
            width = width
        ));
    }
    out
}

/// Flair label for menus; flairs without text fall back to their id
fn display_text(flair: &Flair) -> &str {
    if flair.flair_text.is_empty() {
        &flair.flair_id
    } else {
        &flair.flair_text
    }
}

fn prompt_error(e: dialoguer::Error) -> SubcastError {
    SubcastError::Io(std::io::Error::other(e.to_string()))
}
