use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use cashcompass::{
    BudgetAmount, ExpenseAmount, MonthlyIncome, NewExpense, PasswordHash, ValidatedPassword,
    add_preset_categories, create_expense, create_user, get_categories, initialize_db,
    parse_email, set_monthly_income, update_category,
};

const TEST_EMAIL: &str = "test@example.com";
const TEST_PASSWORD: &str = "test";
const DAYS_OF_EXPENSES: i64 = 365;

/// A utility for creating a test database for CashCompass.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;
    initialize_db(&connection)?;

    println!("Creating test user {TEST_EMAIL} with the password \"{TEST_PASSWORD}\"...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(parse_email(TEST_EMAIL)?, password_hash, &connection)?;

    set_monthly_income(
        user.id,
        MonthlyIncome::new(Decimal::new(5000, 0))?,
        &connection,
    )?;

    println!("Adding preset categories...");
    add_preset_categories(user.id, &connection)?;
    let categories = get_categories(user.id, &connection)?;

    for (index, category) in categories.iter().enumerate() {
        let budget = Decimal::from(100 + 50 * index as i64);
        update_category(
            category.id,
            user.id,
            category.name.clone(),
            category.color.clone(),
            BudgetAmount::new(budget)?,
            &connection,
        )?;
    }

    println!("Creating a year of expenses...");
    let now = OffsetDateTime::now_utc();
    let mut expense_count = 0;

    for day in 0..DAYS_OF_EXPENSES {
        // Cycle through the categories with amounts that vary from day to day.
        for (index, category) in categories.iter().enumerate() {
            if (day + index as i64) % 4 != 0 {
                continue;
            }

            let cents = 500 + (day * 37 + index as i64 * 113) % 9500;
            create_expense(
                NewExpense {
                    user_id: user.id,
                    category_id: category.id,
                    amount: ExpenseAmount::new(Decimal::new(cents, 2))?,
                    description: Some(format!("{} #{}", category.name, day)),
                    created_at: now - Duration::days(day),
                },
                &connection,
            )?;
            expense_count += 1;
        }
    }

    println!("Created {expense_count} expenses.");
    println!("Success!");

    Ok(())
}
