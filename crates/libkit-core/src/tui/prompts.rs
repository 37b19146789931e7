//! Charm-style rename wizard using cliclack

use crate::customize::{self, Customization};
use crate::project::Project;
use anyhow::Result;
use std::path::Path;

const RULE: &str = "------------------------------------------------------------------";

/// CLI arguments for the customize command
#[derive(Debug, Clone, Default)]
pub struct CustomizeArgs {
    /// New package name, including the scope
    pub name: Option<String>,

    /// New short description
    pub description: Option<String>,

    /// Apply without asking for confirmation
    pub yes: bool,
}

impl CustomizeArgs {
    fn fully_specified(&self) -> bool {
        self.name.is_some() && self.description.is_some()
    }
}

/// Run the rename wizard with interactive prompts
pub async fn run_customize(project: &Project, args: CustomizeArgs) -> Result<()> {
    cliclack::intro("Customize library")?;

    let (name, description) = customize::current_identity(project).await?;
    let current = Customization {
        name: name.clone(),
        description: description.clone(),
        new_name: name.clone(),
        new_description: description.clone(),
    };

    // Step 1: Find every file mentioning the current name or description
    let spinner = cliclack::spinner();
    spinner.start("Building the index of files which will need to be customized...");
    let index = match customize::index_project(project, &current) {
        Ok(index) => index,
        Err(e) => {
            spinner.error("Failed to build index");
            return Err(e);
        }
    };
    spinner.stop(format!("Index built ({} files)", index.len()));

    // Step 2: Ask for the new values until they are approved
    let customization = loop {
        let new_name = prompt_name(&name, &args)?;
        let new_description = prompt_description(&description, &args)?;
        let candidate = Customization {
            new_name,
            new_description,
            ..current.clone()
        };

        print_summary(&candidate)?;

        let approved = if args.yes {
            true
        } else {
            cliclack::confirm("Do you want to apply these changes?")
                .initial_value(false)
                .interact()?
        };

        if approved {
            break candidate;
        }
        if args.fully_specified() {
            anyhow::bail!("Customization cancelled.");
        }
    };

    if customization.is_noop() {
        cliclack::outro("Nothing to change")?;
        return Ok(());
    }

    // Step 3: Rewrite package.json and the indexed files
    let spinner = cliclack::spinner();
    spinner.start("Updating files...");
    let updated = match customize::apply(project, &index, &customization).await {
        Ok(updated) => updated,
        Err(e) => {
            spinner.error("Update failed");
            return Err(e);
        }
    };
    spinner.stop(format!("Updated {} files", updated.len()));

    for file in &updated {
        cliclack::log::success(format!("Updated {}", display_relative(project.root(), file)))?;
    }

    cliclack::outro("All files have been updated")?;

    Ok(())
}

fn prompt_name(current: &str, args: &CustomizeArgs) -> Result<String> {
    if let Some(name) = &args.name {
        customize::validate_package_name(name, current).map_err(anyhow::Error::msg)?;
        cliclack::log::info(format!("Using name: {}", name))?;
        return Ok(name.clone());
    }

    let unchanged = current.to_string();
    let name: String =
        cliclack::input("Enter an updated name for the library, including the namespace")
            .default_input(current)
            .validate(move |input: &String| customize::validate_package_name(input, &unchanged))
            .interact()?;

    Ok(name)
}

fn prompt_description(current: &str, args: &CustomizeArgs) -> Result<String> {
    if let Some(description) = &args.description {
        customize::validate_description(description).map_err(anyhow::Error::msg)?;
        cliclack::log::info(format!("Using description: {}", description))?;
        return Ok(description.clone());
    }

    let description: String =
        cliclack::input("Enter an updated short description for the library")
            .default_input(current)
            .validate(|input: &String| customize::validate_description(input))
            .interact()?;

    Ok(description)
}

fn print_summary(customization: &Customization) -> Result<()> {
    cliclack::log::remark(format!(
        "{}\nName: {} -> {}\nDescription: {} -> {}\n{}",
        RULE,
        customization.name,
        customization.new_name,
        customization.description,
        customization.new_description,
        RULE
    ))?;
    Ok(())
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
