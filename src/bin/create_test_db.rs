use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use budgetme::{
    Name, NewAccount, PasswordHash, ValidatedPassword, create_account, create_user, initialize_db,
    seed_default_categories,
};

const TEST_EMAIL: &str = "test@example.com";
const TEST_PASSWORD: &str = "test";

/// A utility for creating a test database for the BudgetMe server.
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
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {TEST_EMAIL} with password \"{TEST_PASSWORD}\"...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(TEST_EMAIL, password_hash, &conn)?;

    println!("Adding default categories and a wallet...");

    seed_default_categories(user.id, &conn)?;
    create_account(
        user.id,
        NewAccount {
            name: Name::new("Wallet")?,
            balance: 5000.0,
            currency: String::new(),
        },
        &conn,
    )?;

    println!("Success!");

    Ok(())
}
