//! Parser for the text output of the system `ping` utility.
//!
//! Understands the iputils/BSD reply format (`time=12.3 ms`) and the Windows
//! one (`time=14ms`, `time<1ms`).

/// Round-trip times in milliseconds of every reply line, in output order.
///
/// Duplicate replies (iputils marks them `(DUP!)`) answer an echo that was
/// already counted and are skipped.
pub fn parse_reply_times(output: &str) -> Vec<f64> {
    output.lines().filter_map(reply_time).collect()
}

fn reply_time(line: &str) -> Option<f64> {
    if line.contains("(DUP!)") {
        return None;
    }
    let start = line.find("time=").or_else(|| line.find("time<"))?;
    let value = &line[start + "time=".len()..];
    let end = value.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(value.len());
    value[..end].parse::<f64>().ok().filter(|ms| ms.is_finite())
}

/// The `(transmitted, received)` counters of the statistics footer
pub fn parse_transmit_summary(output: &str) -> Option<(u32, u32)> {
    output.lines().find_map(|line| {
        if let Some(rest) = line.trim().strip_prefix("Packets: Sent = ") {
            // Windows: "Packets: Sent = 4, Received = 3, Lost = 1 (25% loss),"
            let mut parts = rest.split(',');
            let sent = leading_number(parts.next()?)?;
            let received = leading_number(parts.next()?.trim().strip_prefix("Received = ")?)?;
            return Some((sent, received));
        }

        // iputils/BSD: "5 packets transmitted, 3 received, 40% packet loss"
        let mut parts = line.split(',');
        let transmitted = parts.next()?.trim();
        if !transmitted.ends_with("packets transmitted") {
            return None;
        }
        let sent = leading_number(transmitted)?;
        let received = leading_number(parts.next()?.trim())?;
        Some((sent, received))
    })
}

fn leading_number(text: &str) -> Option<u32> {
    text.split_whitespace().next()?.parse().ok()
}
