// Command errors flow through anyhow and are rendered once, at process
// exit, with their cause chain.

pub fn format_error(err: &anyhow::Error) -> String {
    let mut msg = format!("error: {err}");
    for cause in err.chain().skip(1) {
        msg.push_str(&format!("\n  caused by: {cause}"));
    }
    msg
}
