use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{NewUser, UserId, UserRecord};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/users.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateUser {
        name: String,
        email: String,
    },
    GetUser {
        user_id: i64,
    },
    UpdateUser {
        user_id: i64,
        name: String,
        email: String,
    },
    ListUsers,
    DeleteUser {
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateUser { name, email } => {
            let user = storage.create_user(&NewUser::new(name, email)).await?;
            println!("created {}", describe(&user));
        }
        Command::GetUser { user_id } => match storage.get_user(UserId(user_id)).await? {
            Some(user) => println!("{}", describe(&user)),
            None => bail!("user {user_id} not found"),
        },
        Command::UpdateUser {
            user_id,
            name,
            email,
        } => {
            let rows_affected = storage
                .update_user(&NewUser::new(name, email).with_id(UserId(user_id)))
                .await?;
            println!("rows affected by update: {rows_affected}");
        }
        Command::ListUsers => {
            for user in storage.list_users().await? {
                println!("{}", describe(&user));
            }
        }
        Command::DeleteUser { user_id } => {
            if !storage.delete_user(UserId(user_id)).await? {
                bail!("user {user_id} not found");
            }
            println!("deleted user_id={user_id}");
        }
    }

    Ok(())
}

fn describe(user: &UserRecord) -> String {
    format!("user_id={} name={} email={}", user.id.0, user.name, user.email)
}
