//! Port-to-process resolution service.

use tracing::debug;

use crate::adapters::PortScanner;
use crate::domain::PortBinding;
use crate::error::{Error, Result};
use crate::ports::BindingSource;

/// Validate a user-supplied port number.
pub fn validate_port(port: i64) -> Result<u16> {
    match u16::try_from(port) {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(Error::InvalidPort(port)),
    }
}

/// Application service answering "who is listening on this port?".
///
/// Every call reads the source afresh; nothing is cached.
#[derive(Debug, Clone, Default)]
pub struct Resolver<S: BindingSource = PortScanner> {
    source: S,
}

impl Resolver<PortScanner> {
    /// Resolver for the running operating system.
    pub fn system() -> Self {
        Self::new(PortScanner::new())
    }
}

impl<S: BindingSource> Resolver<S> {
    /// Create a resolver over the given binding source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// All listening sockets, sorted ascending by port.
    ///
    /// The sort is stable, so bindings sharing a port keep source order.
    pub async fn scan(&self) -> Result<Vec<PortBinding>> {
        let mut bindings = self.source.read_bindings().await?;
        bindings.sort_by_key(|b| b.port());
        debug!(count = bindings.len(), "Scanned listening sockets");
        Ok(bindings)
    }

    /// Every binding on exactly `port`. Empty when nothing listens there.
    pub async fn find_by_port(&self, port: i64) -> Result<Vec<PortBinding>> {
        let port = validate_port(port)?;
        let matches: Vec<PortBinding> = self
            .scan()
            .await?
            .into_iter()
            .filter(|b| b.port() == port)
            .collect();
        debug!(port, count = matches.len(), "Resolved port");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Transport;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Mock source for testing.
    struct MockSource {
        bindings: Vec<PortBinding>,
        reads: Arc<Mutex<usize>>,
    }

    impl MockSource {
        fn new(bindings: Vec<PortBinding>) -> Self {
            Self {
                bindings,
                reads: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl BindingSource for MockSource {
        async fn read_bindings(&self) -> Result<Vec<PortBinding>> {
            *self.reads.lock() += 1;
            Ok(self.bindings.clone())
        }
    }

    struct BrokenSource;

    impl BindingSource for BrokenSource {
        async fn read_bindings(&self) -> Result<Vec<PortBinding>> {
            Err(Error::SourceUnavailable("cannot read /proc/net/tcp".to_string()))
        }
    }

    fn binding(port: u16, pid: u32, name: &str) -> PortBinding {
        PortBinding::new(port, pid, name, "mike", Transport::Tcp, "*")
    }

    #[tokio::test]
    async fn test_scan_sorts_by_port() {
        let resolver = Resolver::new(MockSource::new(vec![
            binding(8080, 3, "nginx"),
            binding(3000, 1, "node"),
            binding(5432, 2, "postgres"),
        ]));

        let ports: Vec<u16> = resolver.scan().await.unwrap().iter().map(|b| b.port()).collect();
        assert_eq!(ports, vec![3000, 5432, 8080]);
    }

    #[tokio::test]
    async fn test_scan_is_stable_for_shared_ports() {
        let resolver = Resolver::new(MockSource::new(vec![
            binding(8080, 30, "worker-b"),
            binding(3000, 10, "node"),
            binding(8080, 20, "worker-a"),
        ]));

        let pids: Vec<u32> = resolver.scan().await.unwrap().iter().map(|b| b.pid()).collect();
        assert_eq!(pids, vec![10, 30, 20]);
    }

    #[tokio::test]
    async fn test_find_by_port() {
        let resolver = Resolver::new(MockSource::new(vec![
            binding(3000, 1, "node"),
            binding(30000, 2, "other"),
            binding(3000, 3, "node"),
        ]));

        let found = resolver.find_by_port(3000).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|b| b.port() == 3000));
    }

    #[test]
    fn test_find_by_port_without_listener() {
        let resolver = Resolver::new(MockSource::new(vec![binding(3000, 1, "node")]));
        let found = tokio_test::block_on(resolver.find_by_port(9999)).unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_port_rejects_out_of_range() {
        let source = MockSource::new(vec![binding(3000, 1, "node")]);
        let reads = source.reads.clone();
        let resolver = Resolver::new(source);

        for port in [0, -1, 65536, i64::MAX] {
            match resolver.find_by_port(port).await {
                Err(Error::InvalidPort(p)) => assert_eq!(p, port),
                other => panic!("expected InvalidPort for {port}, got {:?}", other),
            }
        }
        // Validation happens before any read
        assert_eq!(*reads.lock(), 0);
    }

    #[tokio::test]
    async fn test_every_call_rescans() {
        let source = MockSource::new(vec![]);
        let reads = source.reads.clone();
        let resolver = Resolver::new(source);

        assert!(resolver.scan().await.unwrap().is_empty());
        resolver.find_by_port(1).await.unwrap();
        assert_eq!(*reads.lock(), 2);
    }

    #[tokio::test]
    async fn test_source_errors_propagate() {
        let resolver = Resolver::new(BrokenSource);
        assert!(matches!(
            resolver.scan().await,
            Err(Error::SourceUnavailable(_))
        ));
        assert!(matches!(
            resolver.find_by_port(80).await,
            Err(Error::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_validate_port() {
        assert_eq!(validate_port(1).unwrap(), 1);
        assert_eq!(validate_port(65535).unwrap(), 65535);
        assert!(validate_port(0).is_err());
        assert!(validate_port(65536).is_err());
    }
}
