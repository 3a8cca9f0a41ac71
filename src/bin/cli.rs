use clap::{Parser, Subcommand};
use std::sync::Arc;
use userdemo::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    db,
    models::UserFilter,
    repositories::SqliteUserRepository,
    services::{
        user_service::{CreateUserRequest, UpdateUserRequest},
        CredentialHasher, UserService,
    },
};

#[derive(Parser)]
#[command(name = "userdemo-cli")]
#[command(about = "CLI tool for managing userdemo users", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        login: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Optional email address
        #[arg(short, long)]
        email: Option<String>,
    },

    /// List users
    List {
        /// Maximum number of users to display
        #[arg(short = 'n', long)]
        limit: Option<i64>,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Delete a user
    Delete {
        /// Login of the user to delete
        #[arg(short, long)]
        login: String,
    },

    /// Set a new password for a user
    SetPassword {
        /// Login of the user
        #[arg(short, long)]
        login: String,

        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn get_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn confirm_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    let password = get_password(prompt)?;
    let confirm = get_password("Confirm password")?;
    if password != confirm {
        eprintln!("Passwords do not match");
        std::process::exit(1);
    }
    Ok(password)
}

fn fail(action: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("Failed to {}: {}", action, err);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    // Connect to database
    let pool = db::create_pool(&config.database).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    // Initialize services
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let user_service = UserService::new(user_repository, CredentialHasher::new(&config.password)?);

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                login,
                password,
                email,
            } => {
                let password = match password {
                    Some(pw) => pw,
                    None => confirm_password("Password")?,
                };

                let request = CreateUserRequest {
                    login,
                    password,
                    email,
                };

                match user_service.create_user(request).await {
                    Ok(user) => {
                        println!("User created");
                        println!("  ID: {}", user.id);
                        println!("  Login: {}", user.login);
                    }
                    Err(err) => fail("create user", err),
                }
            }

            UserCommands::List { limit, offset } => {
                let filter = UserFilter {
                    login: None,
                    limit,
                    offset: Some(offset),
                };
                match user_service.list_users(filter).await {
                    Ok(users) if users.is_empty() => println!("No users found."),
                    Ok(users) => {
                        println!(
                            "{:<6} {:<30} {:<30} {:<12} {:<12}",
                            "ID", "Login", "Email", "Created", "Updated"
                        );
                        println!("{}", "-".repeat(94));
                        for user in users {
                            println!(
                                "{:<6} {:<30} {:<30} {:<12} {:<12}",
                                user.id,
                                user.login,
                                user.email.as_deref().unwrap_or("-"),
                                user.created_at,
                                user.updated_at
                            );
                        }
                    }
                    Err(err) => fail("list users", err),
                }
            }

            UserCommands::Delete { login } => match user_service.find_user_by_login(&login).await {
                Ok(Some(user)) => match user_service.delete_user(user.id).await {
                    Ok(()) => println!("User '{}' deleted", login),
                    Err(err) => fail("delete user", err),
                },
                Ok(None) => fail("delete user", format!("user '{}' not found", login)),
                Err(err) => fail("find user", err),
            },

            UserCommands::SetPassword { login, password } => {
                match user_service.find_user_by_login(&login).await {
                    Ok(Some(user)) => {
                        let password = match password {
                            Some(pw) => pw,
                            None => confirm_password("New password")?,
                        };

                        let request = UpdateUserRequest {
                            user_id: user.id,
                            login: None,
                            password: Some(password),
                            email: None,
                        };

                        match user_service.update_user(request).await {
                            Ok(_) => println!("Password updated for '{}'", login),
                            Err(err) => fail("update password", err),
                        }
                    }
                    Ok(None) => fail("update password", format!("user '{}' not found", login)),
                    Err(err) => fail("find user", err),
                }
            }
        },
    }

    pool.close().await;
    Ok(())
}
