use std::path::PathBuf;

/// Filesystems served over the network. Probing these can hang on a dead
/// server, and they are not local capacity anyway.
const NETWORK_FILESYSTEMS: &[&str] = &[
    "nfs", "nfs4", "cifs", "smbfs", "smb2", "smb3", "afs", "ncpfs", "9p", "autofs", "davfs",
    "fuse.sshfs", "fuse.rclone", "fuse.gvfsd-fuse", "webdav",
];

const OPTICAL_FILESYSTEMS: &[&str] = &["iso9660", "udf", "cd9660", "cdfs"];

/// Kernel and memory backed mounts that report capacity but are not volumes.
const PSEUDO_FILESYSTEMS: &[&str] = &[
    "tmpfs", "devtmpfs", "squashfs", "overlay", "proc", "sysfs", "devfs", "ramfs",
];

pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

pub fn is_network_fs(fs_type: &str) -> bool {
    let fs = fs_type.to_ascii_lowercase();
    NETWORK_FILESYSTEMS.contains(&fs.as_str()) || fs.starts_with("smb")
}

pub fn is_optical_fs(fs_type: &str) -> bool {
    OPTICAL_FILESYSTEMS.contains(&fs_type.to_ascii_lowercase().as_str())
}

pub fn is_pseudo_fs(fs_type: &str) -> bool {
    PSEUDO_FILESYSTEMS.contains(&fs_type.to_ascii_lowercase().as_str())
}

/// True when a mount with this filesystem and removable flag counts as a
/// fixed local volume.
pub fn is_fixed_volume(fs_type: &str, removable: bool) -> bool {
    !removable && !is_network_fs(fs_type) && !is_optical_fs(fs_type) && !is_pseudo_fs(fs_type)
}
