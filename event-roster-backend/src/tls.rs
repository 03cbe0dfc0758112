use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use event_roster_config::TlsConfig;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::error::AppError;

/// Loads the PEM certificate chain and private key and offers h2 and http/1.1.
pub fn load_tls_acceptor(config: &TlsConfig) -> Result<TlsAcceptor, AppError> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(File::open(&config.cert)?))
        .collect::<Result<Vec<_>, _>>()?;
    let key = rustls_pemfile::private_key(&mut BufReader::new(File::open(&config.key)?))?
        .ok_or_else(|| AppError::NoPrivateKey(config.key.display().to_string()))?;

    let mut server_config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(server_config)))
}
