use league_admin::util::password::hash_password;
use std::env;
use std::process::ExitCode;

/// Prints an argon2 hash for seeding the first account. With a username and e-mail it
/// prints a ready-to-run superadmin insert instead.
fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let (password, account) = match args.as_slice() {
        [password] => (password, None),
        [password, username, email] => (password, Some((username, email))),
        _ => {
            eprintln!("usage: hash_password <password> [<username> <email>]");
            return ExitCode::from(2);
        }
    };

    let hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(e) => {
            eprintln!("could not hash the password: {e}");
            return ExitCode::FAILURE;
        }
    };

    match account {
        None => println!("{hash}"),
        Some((username, email)) => println!(
            "INSERT INTO users (username, email, password_hash, role) VALUES ('{}', '{}', '{}', 'superadmin');",
            username.replace('\'', "''"),
            email.replace('\'', "''"),
            hash
        ),
    }
    ExitCode::SUCCESS
}
