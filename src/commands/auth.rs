//! Account commands: sign up, sign in, sign out, status.

use clap::{Args, Subcommand};
use serde_json::json;
use std::io::{self, Write};

use super::OutputFormat;
use crate::auth::{sign_in, sign_up_or_sign_in, AuthNotice, SessionProvider};
use crate::config::Config;

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Create an account (signs in if the email is already registered)
    Signup(Credentials),
    /// Sign in with email and password
    Signin(Credentials),
    /// Sign out and forget the stored session
    Signout,
    /// Show who is signed in
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct Credentials {
    /// Account email
    #[arg(long, short)]
    email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(long, short)]
    password: Option<String>,
}

impl Credentials {
    fn resolve(&self) -> io::Result<(String, String)> {
        let email = match &self.email {
            Some(email) => email.clone(),
            None => prompt("Email: ")?,
        };
        let password = match &self.password {
            Some(password) => password.clone(),
            None => prompt("Mot de passe: ")?,
        };
        Ok((email, password))
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn report(notice: AuthNotice) -> Result<(), Box<dyn std::error::Error>> {
    if notice.is_success() {
        println!("{}", notice);
        Ok(())
    } else {
        Err(notice.message.into())
    }
}

impl AuthCommand {
    pub async fn run(
        &self,
        auth: &dyn SessionProvider,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AuthSubcommand::Signup(credentials) => {
                let (email, password) = credentials.resolve()?;
                report(sign_up_or_sign_in(auth, &email, &password).await)
            }

            AuthSubcommand::Signin(credentials) => {
                let (email, password) = credentials.resolve()?;
                report(sign_in(auth, &email, &password).await)
            }

            AuthSubcommand::Signout => {
                auth.sign_out().await?;
                println!("Déconnecté.");
                Ok(())
            }

            AuthSubcommand::Status { format } => {
                let session = auth.get_session().await?;
                match format {
                    OutputFormat::Json => {
                        let status = json!({
                            "signed_in": session.is_some(),
                            "user": session.as_ref().map(|s| &s.user),
                            "session_file": config.session_path(),
                        });
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    }
                    OutputFormat::Text => match session {
                        Some(session) => {
                            println!("Signed in as {}", session.user);
                            println!("Session file: {}", config.session_path().display());
                        }
                        None => println!("Not signed in"),
                    },
                }
                Ok(())
            }
        }
    }
}
