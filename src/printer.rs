//! Delivering label scripts.
//!
//! The printer listens on a raw TCP port (usually 9100). A script is written
//! once over a fresh connection which is then closed. Nothing is read back.

use log::{debug, info};
use std::{
    fs::File,
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    path::Path,
};

use crate::{error::Error, tspl::LabelScript};

/// A networked label printer.
#[derive(Debug, Clone)]
pub struct Printer {
    addrs: Vec<SocketAddr>,
}

impl Printer {
    /// Resolve a `host:port` address.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use tspl_label::Printer;
    ///
    /// let printer = Printer::new("labels.local:9100").unwrap();
    /// ```
    pub fn new(address: &str) -> Result<Self, Error> {
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidConfig(format!("expected host:port, got {:?}", address)))?;
        if host.is_empty() {
            return Err(Error::InvalidConfig(format!("missing host in {:?}", address)));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid port in {:?}", address)))?;

        let addrs: Vec<SocketAddr> = (host.trim_start_matches('[').trim_end_matches(']'), port)
            .to_socket_addrs()
            .map_err(|err| Error::InvalidConfig(format!("cannot resolve {:?}: {}", address, err)))?
            .collect();
        if addrs.is_empty() {
            return Err(Error::InvalidConfig(format!("{:?} resolved to nothing", address)));
        }
        debug!("{} resolved to {:?}", address, addrs);
        Ok(Printer { addrs })
    }

    pub fn from_addr(addr: SocketAddr) -> Self {
        Printer { addrs: vec![addr] }
    }

    /// Send the script and close the connection.
    pub fn print(&self, script: &LabelScript) -> Result<(), Error> {
        let mut stream = TcpStream::connect(&self.addrs[..])?;
        let peer = stream.peer_addr()?;
        debug!("Connected to {:?}", peer);

        stream.write_all(script.as_bytes())?;
        stream.flush()?;
        match stream.shutdown(Shutdown::Write) {
            Ok(()) => {}
            // the printer may already have hung up after reading everything
            Err(err) if err.kind() == io::ErrorKind::NotConnected => {}
            Err(err) => return Err(Error::Transport(err)),
        }
        info!("Sent {} bytes to {:?}", script.len(), peer);
        Ok(())
    }
}

/// Write the script to `path` instead of a printer; `-` means stdout.
pub fn write_to_file(script: &LabelScript, path: &Path) -> Result<(), Error> {
    if path == Path::new("-") {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        out.write_all(script.as_bytes())?;
        out.flush()?;
    } else {
        let mut file = File::create(path)?;
        file.write_all(script.as_bytes())?;
        file.flush()?;
    }
    info!("Wrote {} bytes to {:?}", script.len(), path);
    Ok(())
}
