use std::{process::Command, thread::sleep, time::Duration};

pub(crate) use child_process_terminator::ChildProcessTerminator;

mod child_process_terminator;

fn rostopic_listing_succeeds(master_uri: &str) -> bool {
    Command::new("rostopic")
        .arg("list")
        .env("ROS_MASTER_URI", master_uri)
        .output()
        .unwrap()
        .status
        .success()
}

/// Starts roscore on an unused port and waits until it accepts requests.
/// Returns the master URI.
pub(crate) fn run_roscore() -> (ChildProcessTerminator, String) {
    let port = portpicker::pick_unused_port().expect("no free port");
    let master_uri = format!("http://localhost:{port}");
    println!("Running roscore on {master_uri}");
    let roscore =
        ChildProcessTerminator::spawn(Command::new("roscore").arg("-p").arg(format!("{port}")));
    while !rostopic_listing_succeeds(&master_uri) {
        sleep(Duration::from_millis(100));
    }
    (roscore, master_uri)
}
