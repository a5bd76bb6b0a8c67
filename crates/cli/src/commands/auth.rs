//! Customer account commands.

use clap::Subcommand;

use super::load_app;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and clear the stored token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Change the account password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

pub async fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = load_app().await?;
    let session = app
        .session_mut()
        .ok_or("STONEFIRE_API_URL is not set; authentication needs a backend")?;

    match action {
        AuthAction::Signup {
            name,
            email,
            password,
            phone,
        } => {
            session.signup(&name, &email, &password, &phone).await?;
            println!("account created; sign in with `sf-cli auth login`");
        }
        AuthAction::Login { email, password } => match session.login(&email, &password).await {
            Ok(user) => println!("signed in as {} <{}>", user.name, user.email),
            Err(stonefire_storefront::session::AuthError::Api(e)) => {
                // Surface the field hint the backend attaches to login errors
                match e.field() {
                    Some(field) => return Err(format!("{} ({field})", e.user_message()).into()),
                    None => return Err(e.user_message().into()),
                }
            }
            Err(e) => return Err(e.into()),
        },
        AuthAction::Logout => {
            session.logout()?;
            println!("signed out");
        }
        AuthAction::Whoami => match session.current_user() {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                if let Some(phone) = &user.phone {
                    println!("phone: {phone}");
                }
            }
            None => println!("not signed in"),
        },
        AuthAction::ChangePassword { current, new } => {
            session.change_password(&current, &new).await?;
            println!("password changed");
        }
    }
    Ok(())
}
