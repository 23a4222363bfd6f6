//! Linux port scanner reading the kernel socket tables under `/proc`.
//!
//! `/proc/net/tcp` and `/proc/net/tcp6` list every TCP socket with its state,
//! local address, owning uid and inode. The inode is joined against the
//! `socket:[<inode>]` links in each process's `fd/` directory to find the
//! owning PID.
//!
//! Attribution is first match wins, walking PIDs in ascending order. A socket
//! inherited by several processes (e.g. a pre-fork server) is attributed to
//! the lowest PID holding it; the kernel offers no single owner to report.

use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::{PortBinding, Transport};
use crate::error::{Error, Result};
use crate::ports::BindingSource;

use super::utils::display_ip;

/// `TCP_LISTEN` in the kernel's `st` column.
const TCP_LISTEN: &str = "0A";

/// sl local_address rem_address st tx_queue:rx_queue tr:tm->when retrnsmt uid timeout inode
const MIN_FIELDS: usize = 10;
const LOCAL_ADDRESS: usize = 1;
const STATE: usize = 3;
const UID: usize = 7;
const INODE: usize = 9;

/// Resolves a uid to an account name.
pub type AccountLookup = fn(u32) -> Option<String>;

/// `/proc`-backed scanner.
#[derive(Debug, Clone)]
pub struct ProcNetScanner {
    proc_root: PathBuf,
    accounts: AccountLookup,
}

/// A LISTEN socket from the kernel table, before process attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SocketRecord {
    pub port: u16,
    pub address: String,
    pub uid: u32,
    pub inode: u64,
    pub transport: Transport,
}

impl ProcNetScanner {
    /// Create a scanner over the live `/proc`.
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Create a scanner over a different procfs mount.
    pub fn with_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            accounts: system_account_name,
        }
    }

    /// Replace the uid-to-name lookup.
    pub fn with_accounts(mut self, accounts: AccountLookup) -> Self {
        self.accounts = accounts;
        self
    }

    fn scan_blocking(&self) -> Result<Vec<PortBinding>> {
        let tcp_path = self.proc_root.join("net").join("tcp");
        let tcp = std::fs::read_to_string(&tcp_path).map_err(|e| {
            warn!(path = %tcp_path.display(), error = %e, "Kernel socket table unreadable");
            Error::SourceUnavailable(format!("cannot read {}: {}", tcp_path.display(), e))
        })?;
        let mut records = parse_socket_table(&tcp, Transport::Tcp);

        // A kernel built without IPv6 has no tcp6 table; that is not an error
        let tcp6_path = self.proc_root.join("net").join("tcp6");
        match std::fs::read_to_string(&tcp6_path) {
            Ok(tcp6) => records.extend(parse_socket_table(&tcp6, Transport::Tcp6)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %tcp6_path.display(), "No IPv6 socket table");
            }
            Err(e) => {
                return Err(Error::SourceUnavailable(format!(
                    "cannot read {}: {}",
                    tcp6_path.display(),
                    e
                )));
            }
        }

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let wanted: HashSet<u64> = records.iter().map(|r| r.inode).collect();
        let owners = self.socket_owners(&wanted);

        let mut names: HashMap<u32, String> = HashMap::new();
        let mut accounts: HashMap<u32, String> = HashMap::new();
        let mut bindings = Vec::with_capacity(records.len());

        for record in records {
            // Sockets we cannot attribute (no visible descriptor) are dropped
            let Some(&pid) = owners.get(&record.inode) else {
                debug!(port = record.port, inode = record.inode, "No process owns socket");
                continue;
            };

            let process_name = names
                .entry(pid)
                .or_insert_with(|| self.process_name(pid))
                .clone();
            let owner = accounts
                .entry(record.uid)
                .or_insert_with(|| (self.accounts)(record.uid).unwrap_or_else(|| record.uid.to_string()))
                .clone();

            bindings.push(PortBinding::new(
                record.port,
                pid,
                process_name,
                owner,
                record.transport,
                record.address,
            ));
        }

        Ok(bindings)
    }

    /// Map each wanted socket inode to the first PID holding a descriptor to it.
    ///
    /// Processes whose `fd/` directory cannot be read (other users' processes
    /// without privileges, processes that just exited) are skipped.
    fn socket_owners(&self, wanted: &HashSet<u64>) -> HashMap<u64, u32> {
        let mut owners = HashMap::new();

        let entries = match std::fs::read_dir(&self.proc_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.proc_root.display(), error = %e, "Cannot list processes");
                return owners;
            }
        };

        let mut pids: Vec<u32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();

        for pid in pids {
            if owners.len() == wanted.len() {
                break;
            }

            let fd_dir = self.proc_root.join(pid.to_string()).join("fd");
            let Ok(fds) = std::fs::read_dir(&fd_dir) else {
                continue;
            };

            for fd in fds.flatten() {
                let Ok(target) = std::fs::read_link(fd.path()) else {
                    continue;
                };
                if let Some(inode) = socket_inode(&target) {
                    if wanted.contains(&inode) {
                        owners.entry(inode).or_insert(pid);
                    }
                }
            }
        }

        owners
    }

    fn process_name(&self, pid: u32) -> String {
        let comm = self.proc_root.join(pid.to_string()).join("comm");
        std::fs::read_to_string(comm)
            .map(|name| name.trim().to_string())
            .unwrap_or_default()
    }
}

impl Default for ProcNetScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingSource for ProcNetScanner {
    async fn read_bindings(&self) -> Result<Vec<PortBinding>> {
        // Walking every process's descriptors is a lot of small blocking reads
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.scan_blocking())
            .await
            .map_err(|e| Error::SourceUnavailable(format!("kernel table scan aborted: {}", e)))?
    }
}

/// Parse a `/proc/net/tcp` or `/proc/net/tcp6` table, keeping LISTEN sockets.
///
/// Expected format:
/// ```text
///   sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
///    0: 00000000:0BB8 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 12345 1 ...
/// ```
pub(crate) fn parse_socket_table(content: &str, transport: Transport) -> Vec<SocketRecord> {
    let mut records = Vec::new();

    // Skip header line
    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            continue;
        }

        if fields[STATE] != TCP_LISTEN {
            continue;
        }

        let Some((ip, port)) = decode_local_address(fields[LOCAL_ADDRESS], transport) else {
            continue;
        };

        let Ok(uid) = fields[UID].parse::<u32>() else {
            continue;
        };

        // Inode 0 means no descriptor references the socket
        let inode = match fields[INODE].parse::<u64>() {
            Ok(0) | Err(_) => continue,
            Ok(inode) => inode,
        };

        records.push(SocketRecord {
            port,
            address: display_ip(ip),
            uid,
            inode,
            transport,
        });
    }

    records
}

/// Decode a kernel `HEXADDR:HEXPORT` local address.
///
/// The address is the in-memory socket address printed as native-endian
/// 32-bit words: one word for IPv4, four for IPv6. The port is plain hex.
pub(crate) fn decode_local_address(field: &str, transport: Transport) -> Option<(IpAddr, u16)> {
    let (addr_hex, port_hex) = field.split_once(':')?;

    let port = u16::try_from(parse_hex_word(port_hex, 4)?).ok()?;
    if port == 0 {
        return None;
    }

    let ip = match transport {
        Transport::Tcp => IpAddr::V4(Ipv4Addr::from(parse_hex_word(addr_hex, 8)?.to_ne_bytes())),
        Transport::Tcp6 => {
            if addr_hex.len() != 32 {
                return None;
            }
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_exact_mut(4).enumerate() {
                let word = parse_hex_word(addr_hex.get(i * 8..i * 8 + 8)?, 8)?;
                chunk.copy_from_slice(&word.to_ne_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    };

    Some((ip, port))
}

/// Parse exactly `digits` hex digits into a u32.
fn parse_hex_word(hex: &str, digits: usize) -> Option<u32> {
    if hex.len() != digits || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Extract the inode from a `socket:[12345]` descriptor link.
fn socket_inode(target: &Path) -> Option<u64> {
    target
        .to_str()?
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Look up an account name in the system user database.
fn system_account_name(uid: u32) -> Option<String> {
    use nix::unistd::{Uid, User};

    User::from_uid(Uid::from_raw(uid))
        .ok()
        .flatten()
        .map(|user| user.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    const TCP_TABLE: &str = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000:0BB8 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 12345 1 0000000000000000 100 0 0 10 0
   1: 0100007F:0050 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 67890 1 0000000000000000 100 0 0 10 0
   2: 00000000:1F90 00000000:0000 01 00000000:00000000 00:00000000 00000000  1000        0 11111 1 0000000000000000 100 0 0 10 0
";

    const TCP6_TABLE: &str = "\
  sl  local_address                         remote_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000000000000000000001000000:18EB 00000000000000000000000000000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 22222 1 0000000000000000 100 0 0 10 0
";

    fn test_accounts(uid: u32) -> Option<String> {
        match uid {
            0 => Some("root".to_string()),
            1000 => Some("mike".to_string()),
            _ => None,
        }
    }

    /// Build a fake procfs with the given net tables and processes.
    ///
    /// Each process is (pid, comm, socket inodes it holds).
    fn fake_proc(tcp: Option<&str>, tcp6: Option<&str>, procs: &[(u32, &str, Vec<u64>)]) -> TempDir {
        let root = TempDir::new().unwrap();
        let net = root.path().join("net");
        fs::create_dir_all(&net).unwrap();
        if let Some(tcp) = tcp {
            fs::write(net.join("tcp"), tcp).unwrap();
        }
        if let Some(tcp6) = tcp6 {
            fs::write(net.join("tcp6"), tcp6).unwrap();
        }

        for (pid, comm, inodes) in procs {
            let dir = root.path().join(pid.to_string());
            let fd_dir = dir.join("fd");
            fs::create_dir_all(&fd_dir).unwrap();
            fs::write(dir.join("comm"), format!("{}\n", comm)).unwrap();
            symlink("/dev/null", fd_dir.join("0")).unwrap();
            for (i, inode) in inodes.iter().enumerate() {
                symlink(format!("socket:[{}]", inode), fd_dir.join((i + 3).to_string())).unwrap();
            }
        }

        root
    }

    fn scanner(root: &TempDir) -> ProcNetScanner {
        ProcNetScanner::with_root(root.path()).with_accounts(test_accounts)
    }

    #[test]
    fn test_decode_port() {
        let (ip, port) = decode_local_address("00000000:0BB8", Transport::Tcp).unwrap();
        assert_eq!(port, 3000);
        assert!(ip.is_unspecified());
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn test_decode_addresses() {
        let (ip, port) = decode_local_address("0100007F:0050", Transport::Tcp).unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(port, 80);

        let (ip, port) =
            decode_local_address("00000000000000000000000001000000:18EB", Transport::Tcp6).unwrap();
        assert_eq!(ip, IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(port, 6379);

        // IPv4-mapped IPv6 address ::ffff:127.0.0.1
        let (ip, _) =
            decode_local_address("0000000000000000FFFF00000100007F:1F90", Transport::Tcp6).unwrap();
        assert_eq!(ip, "::ffff:127.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_local_address("00000000", Transport::Tcp).is_none());
        assert!(decode_local_address("00000000:0000", Transport::Tcp).is_none());
        assert!(decode_local_address("0000000:0BB8", Transport::Tcp).is_none());
        assert!(decode_local_address("0000000G:0BB8", Transport::Tcp).is_none());
        assert!(decode_local_address("00000000:+BB8", Transport::Tcp).is_none());
        assert!(decode_local_address("00000000:0BB8", Transport::Tcp6).is_none());
        assert!(decode_local_address("00000000:0BB8:01", Transport::Tcp).is_none());
    }

    #[test]
    fn test_parse_socket_table_keeps_listeners() {
        let records = parse_socket_table(TCP_TABLE, Transport::Tcp);

        // Record 2 is ESTABLISHED (01) and must be excluded
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].port, 3000);
        assert_eq!(records[0].address, "*");
        assert_eq!(records[0].uid, 1000);
        assert_eq!(records[0].inode, 12345);
        assert_eq!(records[1].port, 80);
        assert_eq!(records[1].inode, 67890);
        assert!(records.iter().all(|r| r.port != 8080));
    }

    #[test]
    fn test_parse_socket_table_malformed() {
        let content = "  sl  local_address rem_address   st\n   0: short\n\n";
        assert!(parse_socket_table(content, Transport::Tcp).is_empty());

        let bad_inode = "\
header
   0: 00000000:0BB8 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 0 1
   1: 00000000:0BB9 00000000:0000 0A 00000000:00000000 00:00000000 00000000  abc        0 5 1
   2: 00000000:0BBA 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 77 1
";
        let records = parse_socket_table(bad_inode, Transport::Tcp);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].port, 3002);
    }

    #[test]
    fn test_socket_inode() {
        assert_eq!(socket_inode(Path::new("socket:[12345]")), Some(12345));
        assert_eq!(socket_inode(Path::new("pipe:[12345]")), None);
        assert_eq!(socket_inode(Path::new("/dev/null")), None);
        assert_eq!(socket_inode(Path::new("socket:[abc]")), None);
    }

    #[tokio::test]
    async fn test_scan_fake_proc() {
        let root = fake_proc(
            Some(TCP_TABLE),
            Some(TCP6_TABLE),
            &[(4242, "node", vec![12345]), (1, "nginx", vec![67890]), (900, "redis", vec![22222, 11111])],
        );

        let bindings = scanner(&root).read_bindings().await.unwrap();
        assert_eq!(bindings.len(), 3);

        // Source order: tcp then tcp6
        assert_eq!(
            bindings[0],
            PortBinding::new(3000, 4242, "node", "mike", Transport::Tcp, "*")
        );
        assert_eq!(bindings[1].port(), 80);
        assert_eq!(bindings[1].pid(), 1);
        assert_eq!(bindings[1].process_name(), "nginx");
        assert_eq!(bindings[1].owner(), "root");
        assert_eq!(bindings[2].port(), 6379);
        assert_eq!(bindings[2].pid(), 900);
        assert_eq!(bindings[2].transport(), Transport::Tcp6);
    }

    #[tokio::test]
    async fn test_unattributed_sockets_are_dropped() {
        // Nobody holds inode 67890
        let root = fake_proc(Some(TCP_TABLE), None, &[(4242, "node", vec![12345])]);

        let bindings = scanner(&root).read_bindings().await.unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].pid(), 4242);
    }

    #[tokio::test]
    async fn test_first_process_wins_shared_inode() {
        // Forked workers inherit the listening socket
        let root = fake_proc(
            Some(TCP_TABLE),
            None,
            &[(300, "worker", vec![12345]), (25, "master", vec![12345]), (1, "nginx", vec![67890])],
        );

        let bindings = scanner(&root).read_bindings().await.unwrap();
        let node_port: Vec<_> = bindings.iter().filter(|b| b.port() == 3000).collect();
        assert_eq!(node_port.len(), 1);
        assert_eq!(node_port[0].pid(), 25);
        assert_eq!(node_port[0].process_name(), "master");
    }

    #[tokio::test]
    async fn test_unknown_uid_falls_back_to_number() {
        let table = "\
header
   0: 00000000:0BB8 00000000:0000 0A 00000000:00000000 00:00000000 00000000  4321        0 12345 1
";
        let root = fake_proc(Some(table), None, &[(77, "app", vec![12345])]);

        let bindings = scanner(&root).read_bindings().await.unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].owner(), "4321");
    }

    #[tokio::test]
    async fn test_missing_comm_gives_empty_name() {
        let root = fake_proc(Some(TCP_TABLE), None, &[(4242, "node", vec![12345])]);
        fs::remove_file(root.path().join("4242").join("comm")).unwrap();

        let bindings = scanner(&root).read_bindings().await.unwrap();
        assert_eq!(bindings[0].process_name(), "");
    }

    #[tokio::test]
    async fn test_missing_tcp6_is_empty() {
        let root = fake_proc(Some(TCP_TABLE), None, &[(4242, "node", vec![12345])]);
        assert!(scanner(&root).read_bindings().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_tcp_is_source_unavailable() {
        let root = fake_proc(None, Some(TCP6_TABLE), &[]);

        match scanner(&root).read_bindings().await {
            Err(Error::SourceUnavailable(msg)) => assert!(msg.contains("tcp")),
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_listeners() {
        let header_only = "  sl  local_address rem_address   st\n";
        let root = fake_proc(Some(header_only), Some(header_only), &[]);

        let bindings = scanner(&root).read_bindings().await.unwrap();
        assert!(bindings.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_scan_live_proc() {
        // Only verifies the live tables are readable
        assert!(ProcNetScanner::new().read_bindings().await.is_ok());
    }
}
