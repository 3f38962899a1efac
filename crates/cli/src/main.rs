use clap::{Parser, Subcommand};
use shs_core::{AccountType, CredentialHasher, Pbkdf2Hasher, Permissions};

#[derive(Parser)]
#[command(name = "shs")]
#[command(about = "SHS clinic registry operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every permission bit with its name and value
    Permissions,
    /// Decode a permission bit-set into bit names
    Decode {
        /// Bit-set as a decimal number or `0x` hex
        bits: String,
    },
    /// Print the default permission bit-set of an account type
    Role {
        /// patient, secretary, admin or super_admin
        account_type: String,
    },
    /// Hash a password the way stored accounts are hashed
    HashPassword {
        /// Plain-text password
        password: String,
    },
}

fn parse_bits(input: &str) -> Result<u64, std::num::ParseIntError> {
    let input = input.trim();
    match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => input.parse(),
    }
}

fn print_set(permissions: Permissions) {
    println!("bits: {} (0x{:x})", permissions.bits(), permissions.bits());
    for name in permissions.names() {
        println!("  {name}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Permissions) => {
            for (name, bit) in Permissions::NAMED {
                println!("{:>6}  {}", bit.bits(), name);
            }
        }
        Some(Commands::Decode { bits }) => {
            let raw = parse_bits(&bits)?;
            let permissions = Permissions::from_bits_retain(raw);
            print_set(permissions);
            let unknown = raw & !Permissions::ALL.bits();
            if unknown != 0 {
                eprintln!("unknown bits: 0x{unknown:x}");
            }
        }
        Some(Commands::Role { account_type }) => {
            let account_type: AccountType = account_type.parse()?;
            println!("{account_type}");
            print_set(account_type.default_permissions());
        }
        Some(Commands::HashPassword { password }) => {
            let hash = Pbkdf2Hasher::default().hash(&password)?;
            println!("{hash}");
        }
        None => {
            println!("Use 'shs --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_parse_as_decimal_or_hex() {
        assert_eq!(parse_bits("48").unwrap(), 48);
        assert_eq!(parse_bits("0x30").unwrap(), 48);
        assert!(parse_bits("forty").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
