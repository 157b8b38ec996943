pub mod loader;
pub mod store;

/// Vector names written by the offloading network's modules.
pub mod vectors {
    pub const TOTAL_SERVICE_TIME: &str = "totalServiceTime:vector";
    pub const QUEUES_VISITED: &str = "queuesVisited:vector";
    pub const WIFI_ACTIVE_TIME: &str = "wifiActiveTime:vector";
    pub const CELL_ACTIVE_TIME: &str = "cellActiveTime:vector";
    pub const DEADLINE_DISTRIB: &str = "deadlineDistrib:vector";
    pub const QUEUE_LENGTH: &str = "queueLength:vector";
}
