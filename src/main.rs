extern crate kasa_cloud;

use std::process;

use clap::{App, Arg};

use kasa_cloud::{
    client::{Client, Command, CommandOutcome},
    error::Result,
};

const COMMANDS: &[&str] = &[
    "list",
    "turnon",
    "turnoff",
    "powercycle",
    "sysinfo",
    "ison",
    "isoff",
];

fn command_list(client: &mut Client, verbose: bool) -> Result<()> {
    for device in client.device_list()? {
        if verbose {
            println!("{}", serde_json::to_string_pretty(&device)?);
        } else {
            let status = if device.is_online() { "Online" } else { "Offline" };
            println!(
                "{}\t{}\t{}",
                pad(&device.alias, 20),
                pad(&device.device_name, 30),
                status,
            );
        }
    }
    Ok(())
}

fn command_device(client: &mut Client, command: Command, device: &str) -> Result<()> {
    match client.run(command, device)? {
        CommandOutcome::Done => println!("Done"),
        CommandOutcome::State(state) => println!("{}", state),
        CommandOutcome::Info(sysinfo) => println!("{}", serde_json::to_string_pretty(&sysinfo)?),
    }
    Ok(())
}

fn pad(value: &str, padding: usize) -> String {
    let pad = " ".repeat(padding.saturating_sub(value.len()));
    format!("{}{}", value, pad)
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn main() {
    env_logger::init();

    let matches = App::new("Kasa cloud CLI")
        .version("0.1")
        .about("Control TPLink Kasa smart plugs and switches through the Kasa cloud.")
        .arg(
            Arg::with_name("command")
                .required(true)
                .possible_values(COMMANDS)
                .help("The command to perform"),
        )
        .arg(
            Arg::with_name("username")
                .long("username")
                .takes_value(true)
                .required(true)
                .help("Kasa cloud account username"),
        )
        .arg(
            Arg::with_name("password")
                .long("password")
                .takes_value(true)
                .required(true)
                .help("Kasa cloud account password"),
        )
        .arg(
            Arg::with_name("device")
                .long("device")
                .takes_value(true)
                .help("Alias or device id of the target device"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .takes_value(false)
                .help("Print full device records for the list command"),
        )
        .get_matches();

    let mut client = Client::new(
        matches.value_of("username").unwrap_or_default(),
        matches.value_of("password").unwrap_or_default(),
    );

    let command = matches.value_of("command").unwrap_or_default();
    let result = if command == "list" {
        command_list(&mut client, matches.is_present("verbose"))
    } else {
        let device = match matches.value_of("device") {
            Some(device) => device,
            None => fail(&format!("--device is required for {}", command)),
        };
        match command.parse::<Command>() {
            Ok(command) => command_device(&mut client, command, device),
            Err(err) => fail(&err),
        }
    };

    if let Err(err) = result {
        fail(&err.to_string());
    }
}
