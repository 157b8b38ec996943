//! Splits a job-level trace by the queue each job was served in.
//!
//! The sink records three vectors per completed job at the same instants: total service time,
//! the queue visited (2 = WiFi, 3 = cellular) and, under a second name, the same timestamps
//! again. The split is only meaningful if they were co-sampled, so any misalignment or unknown
//! queue tag aborts the analysis.

use crate::error::{AnalysisError, Result};

/// Queue tag values written into `queuesVisited:vector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePath {
    Wifi,
    Cellular,
}

impl QueuePath {
    pub const WIFI_TAG: f64 = 2.0;
    pub const CELLULAR_TAG: f64 = 3.0;

    pub fn from_tag(tag: f64) -> Option<Self> {
        if tag == Self::WIFI_TAG {
            Some(QueuePath::Wifi)
        } else if tag == Self::CELLULAR_TAG {
            Some(QueuePath::Cellular)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QueuePath::Wifi => "WiFi",
            QueuePath::Cellular => "Cellular",
        }
    }
}

/// One completed job: when it left the network and how long it was served.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobSample {
    pub time: f64,
    pub service_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSplit {
    pub wifi: Vec<JobSample>,
    pub cellular: Vec<JobSample>,
}

impl QueueSplit {
    pub fn jobs(&self, path: QueuePath) -> &[JobSample] {
        match path {
            QueuePath::Wifi => &self.wifi,
            QueuePath::Cellular => &self.cellular,
        }
    }

    pub fn len(&self) -> usize {
        self.wifi.len() + self.cellular.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Column views of a bucket, in the shape the aggregator takes.
pub fn unzip_jobs(jobs: &[JobSample]) -> (Vec<f64>, Vec<f64>) {
    jobs.iter().map(|j| (j.time, j.service_time)).unzip()
}

/// Routes every job to the WiFi or cellular bucket by its queue tag.
pub fn split_jobs_by_queue(times: [&[f64]; 2], service_times: &[f64], queues: &[f64]) -> Result<QueueSplit> {
    let [service_axis, queue_axis] = times;

    for (what, axis) in [("service-time", service_axis), ("queues-visited", queue_axis)] {
        if axis.len() != service_times.len() || axis.len() != queues.len() {
            return Err(AnalysisError::MisalignedTrace(format!(
                "{} axis has {} samples, service times {}, queue tags {}",
                what,
                axis.len(),
                service_times.len(),
                queues.len()
            )));
        }
    }

    if let Some(row) = service_axis.iter().zip(queue_axis).position(|(a, b)| a != b) {
        return Err(AnalysisError::MisalignedTrace(format!(
            "time axes diverge at row {}: {} vs {}",
            row, service_axis[row], queue_axis[row]
        )));
    }

    let mut split = QueueSplit::default();
    for (row, ((&time, &service_time), &tag)) in service_axis.iter().zip(service_times).zip(queues).enumerate() {
        let job = JobSample { time, service_time };
        match QueuePath::from_tag(tag) {
            Some(QueuePath::Wifi) => split.wifi.push(job),
            Some(QueuePath::Cellular) => split.cellular.push(job),
            None => return Err(AnalysisError::UnexpectedQueueTag { row, tag }),
        }
    }
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_a_partition() {
        let t = [1.0, 2.0, 3.0, 4.0, 5.0];
        let s = [0.1, 0.2, 0.3, 0.4, 0.5];
        let q = [2.0, 3.0, 3.0, 2.0, 3.0];
        let split = split_jobs_by_queue([&t, &t], &s, &q).unwrap();

        assert_eq!(split.len(), t.len());
        assert_eq!(split.wifi.len(), 2);
        assert_eq!(split.cellular.len(), 3);
        assert_eq!(split.wifi[1], JobSample { time: 4.0, service_time: 0.4 });

        let (times, services) = unzip_jobs(split.jobs(QueuePath::Cellular));
        assert_eq!(times, vec![2.0, 3.0, 5.0]);
        assert_eq!(services, vec![0.2, 0.3, 0.5]);
    }

    #[test]
    fn unexpected_tag_is_fatal() {
        let t = [1.0, 2.0, 3.0];
        let err = split_jobs_by_queue([&t, &t], &[1.0, 1.0, 1.0], &[2.0, 3.0, 5.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::UnexpectedQueueTag { row: 2, .. }));
    }

    #[test]
    fn diverging_time_axes_are_fatal() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 2.5, 3.0];
        let err = split_jobs_by_queue([&a, &b], &[1.0; 3], &[2.0; 3]).unwrap_err();
        assert!(matches!(err, AnalysisError::MisalignedTrace(_)));
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let a = [1.0, 2.0];
        assert!(split_jobs_by_queue([&a, &a], &[1.0], &[2.0, 2.0]).is_err());
        assert!(split_jobs_by_queue([&a, &a], &[1.0, 1.0], &[2.0]).is_err());
    }

    #[test]
    fn empty_trace_splits_into_empty_buckets() {
        let split = split_jobs_by_queue([&[], &[]], &[], &[]).unwrap();
        assert!(split.is_empty());
    }
}
