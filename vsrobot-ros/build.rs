use std::path::PathBuf;

fn main() {
    // Message definitions for the `ros` feature, so that building does not
    // require a ROS installation.
    let msg_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("ros_msgs");
    println!("cargo:rerun-if-changed=ros_msgs");
    println!(
        "cargo:rustc-env=ROSRUST_MSG_PATH={}",
        msg_path.to_str().unwrap()
    )
}
