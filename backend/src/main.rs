use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    CartLineRequest, CheckoutRequest, RechargeRequest, RegisterStudentRequest, SetCardStatusRequest, StoreCategory,
};
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tuckshop_backend::config::PosConfig;
use tuckshop_backend::domain::formatting::{category_label, format_amount};
use tuckshop_backend::io::{self, mappers::TransactionMapper};
use tuckshop_backend::storage::{fixtures::mock_students, MemoryConnection};
use tuckshop_backend::{initialize_backend, AppState};

const USAGE: &str = "Usage: tuckshop-backend [--json] <command>

Commands:
  students                               List students and balances
  summary                                Today's dashboard figures
  ledger <card>                          Transactions for one card
  checkout <card> <store> <item:price:qty>...
                                         Buy items (store: tuckShop, dryFoodShop, generalStore)
  recharge <card> <amount>               Add funds to a wallet
  register <name> <class> <card> [balance]
                                         Register a student with the default limits
  block <student-id>                     Block a card
  unblock <student-id>                   Unblock a card
  reset-week                             Zero every student's weekly spend
  export                                 Print all transactions as CSV

Options:
  --json                                 Print the response as JSON";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = PosConfig::from_env()?;
    info!("Seeding in-memory store with mock students");
    let state = initialize_backend(MemoryConnection::with_students(mock_students()), &config);

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json = take_flag(&mut args, "--json");
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    match command.as_str() {
        "students" => print_students(&state, json),
        "summary" => print_summary(&state, json),
        "ledger" => print_ledger(&state, arg(&args, 1, "card")?, json),
        "checkout" => run_checkout(&state, &args[1..], json),
        "recharge" => run_recharge(&state, arg(&args, 1, "card")?, arg(&args, 2, "amount")?, json),
        "register" => run_register(&state, &args[1..], json),
        "block" => run_set_card_status(&state, arg(&args, 1, "student-id")?, false, json),
        "unblock" => run_set_card_status(&state, arg(&args, 1, "student-id")?, true, json),
        "reset-week" => {
            let response = io::reset_weekly_spending(&state)?;
            if json {
                return print_json(&response);
            }
            println!("{}", response.success_message);
            Ok(())
        }
        "export" => {
            let export = io::export_transactions(&state)?;
            if json {
                return print_json(&export);
            }
            print!("{}", export.csv_content);
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            bail!("Unknown command: {}", command)
        }
    }
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|a| a != flag);
    args.len() != before
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing <{}> argument\n\n{}", name, USAGE))
}

fn print_students(state: &AppState<MemoryConnection>, json: bool) -> Result<()> {
    let symbol = &state.currency_symbol;
    let response = io::list_students(state)?;
    if json {
        return print_json(&response);
    }
    for student in response.students {
        println!(
            "{:<12} {:<10} {:<22} {:<10} {:>10} {}",
            student.id,
            student.card_number,
            student.name,
            student.class_name,
            format_amount(student.wallet_balance, symbol),
            if student.is_active { "" } else { "(blocked)" }
        );
    }
    Ok(())
}

fn print_summary(state: &AppState<MemoryConnection>, json: bool) -> Result<()> {
    let symbol = &state.currency_symbol;
    let summary = io::dashboard_summary(state, Utc::now().date_naive())?;
    if json {
        return print_json(&summary);
    }
    println!("Date:             {}", summary.date);
    println!("Purchases today:  {}", summary.purchases_today);
    println!("Revenue today:    {}", format_amount(summary.revenue_today, symbol));
    for store in StoreCategory::ALL {
        println!(
            "  {:<14}  {}",
            category_label(store),
            format_amount(summary.revenue_by_store.get(store), symbol)
        );
    }
    println!("Wallet balances:  {}", format_amount(summary.total_wallet_balance, symbol));
    println!("Active students:  {}", summary.active_students);
    Ok(())
}

fn print_ledger(state: &AppState<MemoryConnection>, card_number: &str, json: bool) -> Result<()> {
    let symbol = &state.currency_symbol;
    let ledger = io::student_ledger(state, card_number)?;
    if json {
        return print_json(&ledger);
    }
    println!(
        "{} ({}) balance {}",
        ledger.student.name,
        ledger.student.class_name,
        format_amount(ledger.student.wallet_balance, symbol)
    );
    for store in StoreCategory::ALL {
        println!(
            "  {:<14} spent {} of {}",
            category_label(store),
            format_amount(ledger.student.current_week_spending.get(store), symbol),
            format_amount(ledger.student.weekly_spending_limits.get(store), symbol)
        );
    }
    for entry in ledger.transactions {
        println!(
            "{}  {:<9} {:>10}  balance {}",
            entry.receipt_id,
            entry.kind,
            format_amount(entry.amount, symbol),
            format_amount(entry.balance_after, symbol)
        );
    }
    Ok(())
}

fn run_checkout(state: &AppState<MemoryConnection>, args: &[String], json: bool) -> Result<()> {
    let card_number = arg(args, 0, "card")?;
    let store_key = arg(args, 1, "store")?;
    let store = StoreCategory::from_key(store_key).ok_or_else(|| anyhow!("Unknown store: {}", store_key))?;
    let lines = args[2..]
        .iter()
        .map(|item| parse_cart_line(item))
        .collect::<Result<Vec<_>>>()?;

    let response = io::checkout(
        state,
        CheckoutRequest {
            card_number: card_number.to_string(),
            store,
            lines,
        },
    )?;
    if json {
        return print_json(&response);
    }
    println!("{} ({})", response.success_message, response.receipt_id);
    println!(
        "Remaining {} limit this week: {}",
        category_label(store),
        format_amount(response.remaining_limit, &state.currency_symbol)
    );
    Ok(())
}

fn run_recharge(state: &AppState<MemoryConnection>, card_number: &str, amount: &str, json: bool) -> Result<()> {
    let amount = Decimal::from_str(amount).with_context(|| format!("Invalid amount: {}", amount))?;
    let response = io::recharge(
        state,
        RechargeRequest {
            card_number: card_number.to_string(),
            amount,
        },
    )?;
    if json {
        return print_json(&response);
    }
    println!("{} ({})", response.success_message, response.receipt_id);
    Ok(())
}

fn run_register(state: &AppState<MemoryConnection>, args: &[String], json: bool) -> Result<()> {
    let opening_balance = match args.get(3) {
        Some(balance) => Decimal::from_str(balance).with_context(|| format!("Invalid balance: {}", balance))?,
        None => Decimal::ZERO,
    };
    let response = io::register_student(
        state,
        RegisterStudentRequest {
            name: arg(args, 0, "name")?.to_string(),
            class_name: arg(args, 1, "class")?.to_string(),
            card_number: arg(args, 2, "card")?.to_string(),
            opening_balance,
            weekly_spending_limits: None,
        },
    )?;
    if json {
        return print_json(&response);
    }
    println!("{} ({})", response.success_message, response.student.id);
    Ok(())
}

fn run_set_card_status(
    state: &AppState<MemoryConnection>,
    student_id: &str,
    is_active: bool,
    json: bool,
) -> Result<()> {
    let response = io::set_card_status(
        state,
        SetCardStatusRequest {
            student_id: student_id.to_string(),
            is_active,
        },
    )?;
    if json {
        return print_json(&response);
    }
    println!("{}", response.success_message);
    Ok(())
}

/// `name:price:qty`, e.g. `pie:12.50:2`
fn parse_cart_line(item: &str) -> Result<CartLineRequest> {
    let parts: Vec<&str> = item.split(':').collect();
    let [name, price, quantity] = parts.as_slice() else {
        bail!("Cart items must look like name:price:qty, got {}", item);
    };
    let unit_price = Decimal::from_str(price).with_context(|| format!("Invalid price in {}", item))?;
    let quantity: u32 = quantity
        .parse()
        .with_context(|| format!("Invalid quantity in {}", item))?;
    Ok(TransactionMapper::cart_line_request(name, name, unit_price, quantity))
}
