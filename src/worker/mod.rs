pub mod job_worker;
