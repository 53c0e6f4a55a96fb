//! User administration commands. The demo catalog accepts writes but does
//! not keep them, so created or changed accounts will not show up in later
//! listings.

use clap::Subcommand;
use fakestore_core::{NewUser, PersonName, UserAccount, UserUpdate};
use fakestore_state::UserStore;

use crate::App;

/// Sub-commands available under `users`.
#[derive(Debug, Subcommand)]
pub enum UsersCommands {
    /// List catalog accounts
    List,
    /// Show one account
    Show { id: i64 },
    /// Register a new account
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FAKESTORE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Change fields of an existing account
    Update {
        id: i64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Requires --lastname
        #[arg(long, requires = "lastname")]
        firstname: Option<String>,
        /// Requires --firstname
        #[arg(long, requires = "firstname")]
        lastname: Option<String>,
    },
    /// Delete an account
    Delete { id: i64 },
}

pub(crate) async fn run(app: &App, command: UsersCommands) -> anyhow::Result<()> {
    let catalog = app.catalog()?;
    let mut store = UserStore::new();
    match command {
        UsersCommands::List => {
            store.fetch_users(&catalog).await;
            fail_on_error(&store)?;
            println!("{:<5}{:<20}EMAIL", "ID", "USERNAME");
            for user in store.users() {
                println!("{:<5}{:<20}{}", user.id, user.username, user.email);
            }
        }
        UsersCommands::Show { id } => {
            store.fetch_user(&catalog, id).await;
            fail_on_error(&store)?;
            if let Some(user) = store.current_user() {
                print_account(user);
            }
        }
        UsersCommands::Create {
            username,
            email,
            password,
        } => {
            let account = store
                .create_user(&catalog, &NewUser::new(&username, &email, &password))
                .await?;
            println!("created user #{} ({})", account.id, account.username);
        }
        UsersCommands::Update {
            id,
            username,
            email,
            password,
            phone,
            firstname,
            lastname,
        } => {
            let update = UserUpdate {
                username,
                email,
                password,
                name: firstname
                    .zip(lastname)
                    .map(|(firstname, lastname)| PersonName {
                        firstname,
                        lastname,
                    }),
                phone,
            };
            if update.is_empty() {
                anyhow::bail!("nothing to update; pass at least one field");
            }
            store.update_user(&catalog, id, &update).await?;
            println!("updated user #{id}");
        }
        UsersCommands::Delete { id } => {
            store.delete_user(&catalog, id).await?;
            println!("deleted user #{id}");
        }
    }
    Ok(())
}

fn fail_on_error(store: &UserStore) -> anyhow::Result<()> {
    match store.error() {
        Some(error) => anyhow::bail!("{error}"),
        None => Ok(()),
    }
}

fn print_account(user: &UserAccount) {
    println!("#{} {}", user.id, user.username);
    println!("Email: {}", user.email);
    if let Some(name) = &user.name {
        println!("Name:  {} {}", name.firstname, name.lastname);
    }
    if let Some(phone) = &user.phone {
        println!("Phone: {phone}");
    }
    if let Some(address) = &user.address {
        println!(
            "Address: {} {}, {} {}",
            address.number, address.street, address.city, address.zipcode
        );
    }
}
