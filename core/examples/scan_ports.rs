//! Example: Scan and display all listening ports.

use tsunami_core::{PortClass, Resolver};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Scanning ports...\n");

    let resolver = Resolver::system();

    match resolver.scan().await {
        Ok(bindings) => {
            if bindings.is_empty() {
                println!("No listening ports found.");
                return;
            }

            println!(
                "{:<6} {:<8} {:<20} {:<12} {:<6} {}",
                "PORT", "PID", "PROCESS", "USER", "PROTO", "CLASS"
            );
            println!("{}", "-".repeat(70));

            for binding in &bindings {
                let class = match binding.port_class() {
                    PortClass::System => "System",
                    PortClass::Registered => "Registered",
                    PortClass::Ephemeral => "Ephemeral",
                };

                println!(
                    "{:<6} {:<8} {:<20} {:<12} {:<6} {}",
                    binding.port(),
                    binding.pid(),
                    binding.process_name(),
                    binding.owner(),
                    binding.transport(),
                    class
                );
            }

            println!("\nTotal: {} sockets", bindings.len());
        }
        Err(e) => {
            eprintln!("Error scanning ports: {}", e);
        }
    }
}
