use clap::Subcommand;

use crate::App;

/// Sub-commands available under `auth`.
#[derive(Debug, Subcommand)]
pub enum AuthCommands {
    /// Sign in with a catalog username and password
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FAKESTORE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
}

pub(crate) async fn run(app: &App, command: AuthCommands) -> anyhow::Result<()> {
    let mut auth = app.auth()?;
    match command {
        AuthCommands::Login { username, password } => {
            let catalog = app.catalog()?;
            auth.login(&catalog, &username, &password).await?;
            if let Some(user) = auth.user() {
                println!("signed in as {} <{}>", user.username, user.email);
            }
        }
        AuthCommands::Logout => {
            auth.logout()?;
            println!("signed out");
        }
        AuthCommands::Whoami => match auth.session() {
            Some(session) => println!(
                "{} <{}> (user #{}, since {})",
                session.user.username,
                session.user.email,
                session.user.id,
                session.authenticated_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => {
                println!("not signed in");
                if let Some(error) = auth.error() {
                    println!("last sign-in error: {error}");
                }
            }
        },
    }
    Ok(())
}
