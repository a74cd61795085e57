// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ownership of the current transport handle.
//!
//! Only the reporting loop touches a [`Connection`], so swapping the handle
//! needs no synchronisation. If probing ever moves to another task the
//! handle must go behind a lock or a channel.

use crate::error::{ConnectionError, TransportError};
use crate::transport::{ConnectionParams, Connector, Pong, Transport};

/// Current transport handle plus what is needed to rebuild it.
pub struct Connection<C: Connector> {
    connector: C,
    params: ConnectionParams,
    transport: C::Transport,
}

impl<C: Connector> Connection<C> {
    /// Build the initial handle. Failure here is fatal to a reporter.
    pub fn establish(connector: C, params: ConnectionParams) -> Result<Self, ConnectionError> {
        let transport = connector.connect(&params)?;
        Ok(Self {
            connector,
            params,
            transport,
        })
    }

    /// Build a fresh handle without installing it.
    pub fn construct(&self) -> Result<C::Transport, ConnectionError> {
        self.connector.connect(&self.params)
    }

    /// Ping the current handle.
    pub async fn probe(&self) -> Result<Pong, TransportError> {
        self.transport.ping().await
    }

    /// Replace the current handle with a fresh one.
    ///
    /// On failure the old handle stays installed, so later sends keep using
    /// it until a reconnect succeeds.
    pub fn reconnect(&mut self) -> Result<(), ConnectionError> {
        self.transport = self.construct()?;
        Ok(())
    }

    pub fn transport(&self) -> &C::Transport {
        &self.transport
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConnector;
    use reqwest::Url;

    fn params() -> ConnectionParams {
        ConnectionParams::new(Url::parse("http://localhost:8086").unwrap())
    }

    #[test]
    fn test_establish_fails_when_connector_fails() {
        let connector = MockConnector::new();
        connector.fail_connects(1);

        let result = Connection::establish(connector.clone(), params());
        assert!(result.is_err());
        assert_eq!(connector.connects(), 1);
    }

    #[tokio::test]
    async fn test_probe_uses_current_handle() {
        let connector = MockConnector::new();
        let conn = Connection::establish(connector.clone(), params()).expect("establish");

        conn.probe().await.expect("ping");
        assert_eq!(connector.pings(), 1);
        assert_eq!(conn.transport().generation(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_swaps_handle() {
        let connector = MockConnector::new();
        let mut conn = Connection::establish(connector.clone(), params()).expect("establish");

        conn.reconnect().expect("reconnect");
        assert_eq!(connector.connects(), 2);
        assert_eq!(conn.transport().generation(), 2);
    }

    #[test]
    fn test_failed_reconnect_keeps_old_handle() {
        let connector = MockConnector::new();
        let mut conn = Connection::establish(connector.clone(), params()).expect("establish");

        connector.fail_connects(1);
        assert!(conn.reconnect().is_err());
        assert_eq!(conn.transport().generation(), 1);

        conn.reconnect().expect("second reconnect");
        assert_eq!(conn.transport().generation(), 3);
    }
}
