use std::io::Write;

use clap::{Parser, Subcommand};
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::{
    lessons_api::LessonsApi,
    models::{SortKey, SortOrder},
    notifier::Notifier,
    view_model::CatalogViewModel,
};

/// One line typed into the shell.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Show the lessons, filtered and sorted
    List,
    /// Only show lessons whose subject contains the text; no text shows everything
    Filter { words: Vec<String> },
    /// Change the sort attribute and order
    Sort {
        #[arg(value_enum)]
        key: SortKey,
        #[arg(value_enum, default_value = "asc")]
        order: SortOrder,
    },
    /// Ask the backend for matching lessons and replace the catalog with them
    Search { words: Vec<String> },
    /// Load the whole catalog again
    Reload,
    /// Put one space of a lesson into the cart
    Add { lesson_id: String },
    /// Take a lesson out of the cart
    Remove { lesson_id: String },
    /// Show the cart and its totals
    Cart,
    /// Show or hide the cart view
    ToggleCart,
    /// Set the customer name
    Name {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Set the customer phone number
    Phone { phone: String },
    /// Place the order
    Submit,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

pub fn parse_line(line: &str) -> Result<ShellCommand, clap::Error> {
    ShellLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
}

fn print_lessons<A: LessonsApi, N: Notifier, W: Write>(
    view_model: &CatalogViewModel<A, N>,
    output: &mut W,
) -> std::io::Result<()> {
    let lessons = view_model.filtered_lessons();
    if lessons.is_empty() {
        return writeln!(output, "No lessons found.");
    }
    for lesson in lessons {
        writeln!(
            output,
            "{:<10} {:<14} {:<12} {:>8.2} {:>3} space(s)  [{}]",
            lesson.id, lesson.subject, lesson.location, lesson.price, lesson.spaces, lesson.icon
        )?;
    }
    Ok(())
}

fn print_cart<A: LessonsApi, N: Notifier, W: Write>(
    view_model: &CatalogViewModel<A, N>,
    output: &mut W,
) -> std::io::Result<()> {
    if view_model.cart().is_empty() {
        return writeln!(output, "Your cart is empty.");
    }
    for line in view_model.cart() {
        writeln!(
            output,
            "{:<10} {:<14} {:<12} {:>8.2} x{}",
            line.lesson_id, line.subject, line.location, line.price, line.quantity
        )?;
    }
    writeln!(
        output,
        "Items: {}, total: {:.2}",
        view_model.total_cart_items(),
        view_model.total_cart_price()
    )
}

async fn execute<A: LessonsApi, N: Notifier, W: Write>(
    view_model: &mut CatalogViewModel<A, N>,
    command: ShellCommand,
    output: &mut W,
) -> std::io::Result<()> {
    match command {
        ShellCommand::List => print_lessons(view_model, output)?,
        ShellCommand::Filter { words } => {
            view_model.set_search_text(&words.join(" "));
            print_lessons(view_model, output)?;
        }
        ShellCommand::Sort { key, order } => {
            view_model.set_sort(key, order);
            print_lessons(view_model, output)?;
        }
        ShellCommand::Search { words } => {
            view_model.search(&words.join(" ")).await;
            print_lessons(view_model, output)?;
        }
        ShellCommand::Reload => {
            view_model.load().await;
            print_lessons(view_model, output)?;
        }
        ShellCommand::Add { lesson_id } => {
            if view_model.add_to_cart(&lesson_id) {
                writeln!(
                    output,
                    "Added {} ({} in cart).",
                    lesson_id,
                    view_model.total_cart_items()
                )?;
            } else {
                writeln!(output, "Cannot add {}.", lesson_id)?;
            }
        }
        ShellCommand::Remove { lesson_id } => {
            if view_model.remove_from_cart(&lesson_id) {
                writeln!(output, "Removed {}.", lesson_id)?;
            } else {
                writeln!(output, "{} is not in the cart.", lesson_id)?;
            }
        }
        ShellCommand::Cart => print_cart(view_model, output)?,
        ShellCommand::ToggleCart => {
            if view_model.toggle_cart() {
                print_cart(view_model, output)?;
            } else {
                writeln!(output, "Cart hidden.")?;
            }
        }
        ShellCommand::Name { words } => view_model.set_customer_name(&words.join(" ")),
        ShellCommand::Phone { phone } => view_model.set_customer_phone(&phone),
        ShellCommand::Submit => {
            if view_model.submit_order().await.is_ok() {
                if let Some(confirmation) = view_model.confirmation() {
                    writeln!(output, "{}", confirmation)?;
                }
            }
        }
        ShellCommand::Quit => {}
    }
    Ok(())
}

/// Reads commands from `input` until it ends or `quit` is typed. A scheduled
/// cart reset is applied between commands as soon as it fires.
pub async fn run<A, N, R, W>(
    view_model: &mut CatalogViewModel<A, N>,
    input: R,
    output: &mut W,
) -> std::io::Result<()>
where
    A: LessonsApi,
    N: Notifier,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut segments = input.split(b'\n');
    print_lessons(view_model, output)?;

    loop {
        output.flush()?;
        tokio::select! {
            segment = segments.next_segment() => {
                let Some(segment) = segment? else {
                    break;
                };
                /* undecodable bytes end up as U+FFFD and fail parsing like any other typo */
                let line = String::from_utf8_lossy(&segment);
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => execute(view_model, command, output).await?,
                    Err(err) => write!(output, "{}", err)?,
                }
            }
            _ = view_model.wait_for_reset() => {
                writeln!(output, "Thank you! Your cart has been cleared.")?;
            }
        }
    }

    info!("Shell closed");
    view_model.teardown();
    output.flush()
}
