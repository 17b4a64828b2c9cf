//! # Terminal Front End
//!
//! Line-oriented driver for the register: one command per stdin line, one
//! JSON response per stdout line.
//!
//! ```text
//! > open 100,00 Ana
//! {"ok":true,"data":{"open":true,"session":{...},"summary":{...}}}
//! > add SKU-1 "Ração 1kg" 25,90 2
//! {"ok":true,"data":{"lines":[...],"pricing":{"total":5180,...}}}
//! > sangria 500
//! {"ok":false,"error":{"code":"INSUFFICIENT_BALANCE","message":"..."}}
//! ```
//!
//! ## Discount Arguments
//! | Typed           | Meaning                               |
//! |-----------------|---------------------------------------|
//! | `10+5`, `10%`   | cascade expression (percent)          |
//! | `5,00`, `5`     | fixed amount                          |
//! | `none`, `off`   | clear the discount                    |

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use balcao_core::{CashRepository, CatalogItem, Money, MovementType};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::commands::cart::{add_to_cart, clear_cart, get_cart, remove_from_cart, update_cart_item};
use crate::commands::cash::{
    close_session, get_session_status, list_sessions, open_session, record_movement,
};
use crate::commands::config::get_config;
use crate::commands::discount::{
    preview_cascade, set_global_discount, set_item_discount, DiscountInput,
};
use crate::commands::sale::complete_sale;
use crate::error::ApiError;
use crate::state::RegisterState;

/// Binary arguments.
#[derive(Debug, Parser)]
#[command(name = "balcao-register", version, about = "Balcão POS register terminal")]
pub struct Args {
    /// Path to register.toml (default: per-user config directory)
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(
    name = "register",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    help_template = "Commands:\n{subcommands}"
)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

/// One register command.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Show the cart and its totals
    Cart,
    /// Add an item: add <id> <name> <price> [quantity]
    Add {
        product_id: String,
        name: String,
        #[arg(value_parser = parse_money, allow_negative_numbers = true)]
        price: Money,
        #[arg(allow_negative_numbers = true)]
        quantity: Option<i64>,
    },
    /// Set a line's quantity (0 removes it)
    #[command(alias = "quantity")]
    Qty {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    #[command(alias = "rm")]
    Remove { product_id: String },
    /// Empty the cart
    Clear,
    /// Set or clear a line discount: `10+5` or `10%` is a percentage, a bare
    /// number such as `10` or `5,00` is a fixed amount, `none`/`off` clears
    Discount {
        product_id: String,
        #[arg(value_parser = parse_discount, allow_negative_numbers = true)]
        discount: DiscountArg,
    },
    /// Set or clear the global discount (same forms as `discount`: `10%` is a
    /// percentage, a bare `10` is a fixed amount)
    Global {
        #[arg(value_parser = parse_discount, allow_negative_numbers = true)]
        discount: DiscountArg,
    },
    /// Resolve a cascade expression, optionally against a base amount
    Preview {
        expression: String,
        #[arg(value_parser = parse_money)]
        base: Option<Money>,
    },
    /// Open the drawer: open [float] [operator]
    Open {
        #[arg(value_parser = parse_money, allow_negative_numbers = true)]
        float: Option<Money>,
        operator: Option<String>,
    },
    /// Withdraw cash from the drawer
    Sangria {
        #[arg(value_parser = parse_money, allow_negative_numbers = true)]
        amount: Money,
        reason: Vec<String>,
    },
    /// Add cash to the drawer
    Suprimento {
        #[arg(value_parser = parse_money, allow_negative_numbers = true)]
        amount: Money,
        reason: Vec<String>,
    },
    /// Show the open session
    Status,
    /// Complete the sale: sale [tendered]
    Sale {
        #[arg(value_parser = parse_money, allow_negative_numbers = true)]
        tendered: Option<Money>,
    },
    /// Close the drawer against the counted cash
    Close {
        #[arg(value_parser = parse_money, allow_negative_numbers = true)]
        counted: Money,
        observations: Vec<String>,
    },
    /// List every session
    Sessions,
    /// Show the configuration
    Config,
    /// Show this help
    Help,
    /// Leave the register
    #[command(alias = "exit")]
    Quit,
}

/// A discount argument as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountArg {
    Clear,
    Set(DiscountInput),
}

impl DiscountArg {
    fn into_input(self) -> Option<DiscountInput> {
        match self {
            DiscountArg::Clear => None,
            DiscountArg::Set(input) => Some(input),
        }
    }
}

/// Outcome of reading one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Empty,
    Help(String),
    Command(Command),
}

fn parse_money(value: &str) -> Result<Money, String> {
    Money::parse(value).map_err(|err| err.to_string())
}

// Never fails: text that is neither an amount nor a keyword goes to the
// cascade resolver, which reports it as INVALID_DISCOUNT.
fn parse_discount(value: &str) -> Result<DiscountArg, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("off") {
        return Ok(DiscountArg::Clear);
    }
    if value.contains('+') || value.ends_with('%') {
        return Ok(DiscountArg::Set(DiscountInput::percent(
            value.trim_end_matches('%'),
        )));
    }
    match Money::parse(value) {
        Ok(amount) => Ok(DiscountArg::Set(DiscountInput::fixed(amount))),
        Err(_) => Ok(DiscountArg::Set(DiscountInput::percent(value))),
    }
}

/// Splits a line on whitespace, keeping double-quoted text together.
pub fn split_words(line: &str) -> Result<Vec<String>, ApiError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err(ApiError::validation("Unterminated quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parses one input line. Blank lines and `#` comments are [`Parsed::Empty`].
pub fn parse_line(line: &str) -> Result<Parsed, ApiError> {
    let words = split_words(line)?;
    match words.first() {
        None => return Ok(Parsed::Empty),
        Some(first) if first.starts_with('#') => return Ok(Parsed::Empty),
        Some(_) => {}
    }

    match CommandLine::try_parse_from(words) {
        Ok(line) => Ok(Parsed::Command(line.command)),
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            Ok(Parsed::Help(err.render().to_string()))
        }
        Err(err) => {
            let rendered = err.render().to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string();
            Err(ApiError::validation(message))
        }
    }
}

fn help_text() -> String {
    CommandLine::command().render_help().to_string()
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|err| ApiError::internal(format!("Could not serialize response: {}", err)))
}

fn joined(words: Vec<String>) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Runs one command against the register.
pub fn dispatch<R: CashRepository>(
    state: &RegisterState<R>,
    command: Command,
) -> Result<Value, ApiError> {
    let cart = state.cart();
    let cash = state.cash();
    let config = state.config();

    match command {
        Command::Cart => to_json(get_cart(cart)?),
        Command::Add {
            product_id,
            name,
            price,
            quantity,
        } => to_json(add_to_cart(
            cart,
            CatalogItem::new(product_id, name, price),
            quantity,
        )?),
        Command::Qty {
            product_id,
            quantity,
        } => to_json(update_cart_item(cart, &product_id, quantity)?),
        Command::Remove { product_id } => to_json(remove_from_cart(cart, &product_id)?),
        Command::Clear => to_json(clear_cart(cart)?),
        Command::Discount {
            product_id,
            discount,
        } => to_json(set_item_discount(cart, &product_id, discount.into_input())?),
        Command::Global { discount } => to_json(set_global_discount(cart, discount.into_input())?),
        Command::Preview { expression, base } => to_json(preview_cascade(&expression, base)?),
        Command::Open { float, operator } => to_json(open_session(cash, config, float, operator)?),
        Command::Sangria { amount, reason } => to_json(record_movement(
            cash,
            MovementType::Sangria,
            amount,
            joined(reason),
        )?),
        Command::Suprimento { amount, reason } => to_json(record_movement(
            cash,
            MovementType::Suprimento,
            amount,
            joined(reason),
        )?),
        Command::Status => to_json(get_session_status(cash)?),
        Command::Sale { tendered } => to_json(complete_sale(cart, cash, config, tendered)?),
        Command::Close {
            counted,
            observations,
        } => to_json(close_session(cash, counted, joined(observations))?),
        Command::Sessions => to_json(list_sessions(cash)?),
        Command::Config => to_json(get_config(config)),
        Command::Help => Ok(Value::String(help_text())),
        Command::Quit => Ok(Value::Null),
    }
}

/// Wraps a command result in the response envelope.
pub fn render_response(result: Result<Value, ApiError>) -> Value {
    match result {
        Ok(data) => json!({ "ok": true, "data": data }),
        Err(err) => json!({ "ok": false, "error": err }),
    }
}

/// Reads commands until end of input or `quit`.
pub fn serve<R, I, O>(state: &RegisterState<R>, input: I, mut output: O) -> io::Result<()>
where
    R: CashRepository,
    I: BufRead,
    O: Write,
{
    for line in input.lines() {
        let line = line?;
        let result = match parse_line(&line) {
            Ok(Parsed::Empty) => continue,
            Ok(Parsed::Help(text)) => Ok(Value::String(text)),
            Ok(Parsed::Command(Command::Quit)) => break,
            Ok(Parsed::Command(command)) => {
                debug!(?command, "Dispatching");
                dispatch(state, command)
            }
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            warn!(error = %err, "Command failed");
        }
        writeln!(output, "{}", render_response(result))?;
        output.flush()?;
    }

    info!("Register input closed");
    Ok(())
}
