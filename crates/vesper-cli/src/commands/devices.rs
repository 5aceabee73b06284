//! Audio device listing command.

use clap::Args;
use vesper_io::list_devices;

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let default = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} ch, {} Hz){}",
            idx, device.name, device.channels, device.default_sample_rate, default
        );
    }
    println!();
    println!("Tip: pass a partial name with --device:");
    println!("  vesper --device \"{}\" noise", devices[0].name);

    Ok(())
}
