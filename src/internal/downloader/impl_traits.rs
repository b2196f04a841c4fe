mod impl_download;
