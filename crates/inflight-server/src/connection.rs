//! One client connection: read a line, dispatch it, write the response line

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;

use inflight_core::{dispatch_line, RequestHandler, Response};
use tracing::warn;

/// Longest request line the server accepts, newline included
pub const MAX_LINE_LEN: u64 = 64 * 1024;

/// Serve requests arriving on `stream` until the peer closes it
///
/// Every line gets exactly one response. Blank lines, lines that are not
/// valid UTF-8 and lines longer than [`MAX_LINE_LEN`] are answered with the
/// generic error like any other malformed request.
pub(crate) fn serve<H>(stream: TcpStream, handler: &H) -> io::Result<()>
where
    H: RequestHandler + ?Sized,
{
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = (&mut reader).take(MAX_LINE_LEN).read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(());
        }
        let response = if read as u64 == MAX_LINE_LEN && !buf.ends_with(b"\n") {
            warn!(limit = MAX_LINE_LEN, "request line too long");
            skip_line(&mut reader)?;
            Response::generic_error()
        } else {
            match std::str::from_utf8(&buf) {
                Ok(line) => dispatch_line(handler, line.trim_end_matches(['\r', '\n'])),
                Err(_) => Response::generic_error(),
            }
        };
        writer.write_all(response.to_line().as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
}

/// Drop input up to and including the next newline
fn skip_line(reader: &mut impl BufRead) -> io::Result<()> {
    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}
