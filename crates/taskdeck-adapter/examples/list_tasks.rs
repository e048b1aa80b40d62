/*
[INPUT]:  Task Service URL and account credentials from the environment
[OUTPUT]: Printed task list for the logged-in account
[POS]:    Examples - login + list flow demonstration
[UPDATE]: When auth flow or list endpoint changes
*/

use std::env;

use taskdeck_adapter::*;

/// Example: log in and list tasks
///
/// TASKDECK_BASE_URL (default http://127.0.0.1:8000), TASKDECK_USER and
/// TASKDECK_PASSWORD must be set. The token is kept in a temp file.
#[tokio::main]
async fn main() {
    println!("=== Task Service List Example ===\n");

    let (Ok(username), Ok(password)) = (env::var("TASKDECK_USER"), env::var("TASKDECK_PASSWORD"))
    else {
        eprintln!("Set TASKDECK_USER and TASKDECK_PASSWORD first");
        return;
    };

    let config = ClientConfig {
        base_url: env::var("TASKDECK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        ..ClientConfig::default()
    };
    let client = match TaskServiceClient::with_config(config, JwtManager::new()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created");

    let store = CredentialStore::new(env::temp_dir().join("taskdeck-example-token"));
    let auth_manager = AuthManager::new(client.clone(), store);

    if let Err(e) = auth_manager.login(&username, &password).await {
        eprintln!("Login failed: {}", e);
        return;
    }
    println!("✓ Logged in as {}", username);

    match client.list_tasks().await {
        Ok(tasks) => {
            println!("\n{} task(s):", tasks.len());
            for task in tasks {
                println!(
                    "  {} | {:<15} | {:<9} | run at {}",
                    task.id,
                    task.task_type.label(),
                    task.status,
                    task.run_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Err(e) => eprintln!("List failed: {}", e),
    }

    if let Err(e) = auth_manager.logout() {
        eprintln!("Logout failed: {}", e);
    }
    println!("\n✓ List example complete");
}
