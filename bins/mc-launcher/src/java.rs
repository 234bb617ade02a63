//! Java runtime checks.

use anyhow::{bail, Context, Result};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Fail unless `java -version` runs successfully.
pub async fn validate_java() -> Result<()> {
    let status = Command::new("java")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .context("Java not found. Please install Java and add it to your PATH")?;

    if !status.success() {
        bail!("`java -version` failed with {}", status);
    }
    debug!("Java runtime found");
    Ok(())
}

/// `mc check-java`: report whether java works and can reserve a 1G heap.
pub async fn check_java() -> Result<i32> {
    println!("Testing Java setup...");

    let output = match Command::new("java").arg("-version").output().await {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            println!("Java not working: `java -version` exited with {}", output.status);
            return Ok(1);
        }
        Err(e) => {
            println!("Java not found: {}", e);
            println!("Please install Java and add it to your PATH");
            return Ok(1);
        }
    };

    // java -version reports on stderr
    println!("Java is installed:");
    print!("{}", String::from_utf8_lossy(&output.stderr));
    print!("{}", String::from_utf8_lossy(&output.stdout));

    let heap_check = Command::new("java")
        .args(["-Xmx1G", "-version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match heap_check {
        Ok(status) if status.success() => {}
        Ok(status) => {
            println!("Java memory allocation test failed: exited with {}", status);
            return Ok(1);
        }
        Err(e) => {
            println!("Java memory allocation test failed: {}", e);
            return Ok(1);
        }
    }

    println!("Java memory allocation works correctly");
    println!("Java setup is valid for running Minecraft servers");
    Ok(0)
}
